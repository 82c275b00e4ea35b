// src/client/mod.rs

//! Storefront-side state: the local cart and the signed-in session.

pub mod client_store;
pub mod client_structs;
pub mod storage;
