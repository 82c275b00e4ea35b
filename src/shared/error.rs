// src/shared/error.rs

//! Request-level error taxonomy.
//!
//! Route handlers return `Result<T, AppError>`. Each variant is one of the
//! failure kinds the API exposes; storage and token detail is logged at the
//! point of failure and never serialized to the client.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use super::shared_structs::{ErrorResponse, MessageResponse};

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed request fields.
    #[error("{0}")]
    Validation(String),

    /// No bearer token was presented.
    #[error("Authentication required")]
    Unauthenticated,

    /// A bearer token was presented but failed verification.
    #[error("Invalid or expired token")]
    Forbidden,

    /// Login failed; deliberately silent about which field was wrong.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    /// Catalog reads could not reach storage.
    #[error("Product catalog is unavailable")]
    CatalogUnavailable,

    #[error("Registration failed")]
    RegistrationFailed,

    #[error("Login failed")]
    LoginFailed,

    /// The order transaction was rolled back.
    #[error("Checkout failed")]
    CheckoutFailed,

    #[error("Internal server error")]
    Internal,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::CatalogUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::RegistrationFailed | Self::LoginFailed | Self::CheckoutFailed | Self::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            // Catalog lookups answer with `{error}`
            Self::NotFound(_) | Self::CatalogUnavailable => builder.json(ErrorResponse {
                error: self.to_string(),
            }),
            _ => builder.json(MessageResponse::new(self.to_string())),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
