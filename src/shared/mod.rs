// src/shared/mod.rs

pub mod db;
pub mod error;
pub mod shared_structs;
pub mod spa_fallback;
