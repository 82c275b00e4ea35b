// src/orders/mod.rs

pub mod order_transaction;
pub mod orders_router;
pub mod orders_structs;
