// src/products/mod.rs

pub mod products_router;
pub mod products_structs;
