// src/users/auth_middleware.rs

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use chrono::Utc;
use futures::future::{ready, Ready};

use super::token::TokenError;
use crate::shared::error::AppError;
use crate::AppState;

/// Identity of the caller, extracted from `Authorization: Bearer <token>`.
///
/// Handlers that take this extractor never run for unauthenticated
/// requests: a missing token rejects with 401, a bad one with 403.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub email: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState missing from app data; auth gate cannot verify tokens");
        return Err(AppError::Internal);
    };

    let token = bearer_token(req).ok_or(AppError::Unauthenticated)?;

    match state.tokens.verify(token, Utc::now().timestamp()) {
        Ok(identity) => Ok(AuthenticatedUser {
            user_id: identity.user_id,
            email: identity.email,
        }),
        Err(TokenError::Expired) => {
            tracing::debug!("Rejected expired bearer token");
            Err(AppError::Forbidden)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rejected bearer token");
            Err(AppError::Forbidden)
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then_some(token)
}
