// src/shared/shared_structs.rs

use serde::{Deserialize, Serialize};

/// Body of every `{message}` reply: validation, auth, conflict and
/// transactional failures, plus plain acknowledgements.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Body of catalog failures, which the storefront reads as `{error}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
