// src/users/mod.rs

pub mod auth_middleware;
pub mod token;
pub mod users_router;
pub mod users_structs;
