// src/users/users_router.rs

use std::sync::OnceLock;

use actix_web::{post, web, HttpResponse};
use bcrypt::{hash, verify};
use chrono::Utc;

use super::token::Identity;
use super::users_structs::{
    normalize_email, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, User,
    UserSummary,
};
use crate::shared::error::{AppError, Result};
use crate::AppState;

/// bcrypt work factor for stored password hashes.
pub const BCRYPT_COST: u32 = 10;

const UNIQUE_VIOLATION: &str = "23505";

/// Create an account.
///
/// The password is hashed on the blocking pool before the single-row
/// insert. Email uniqueness is left to the `users.email` constraint, so two
/// concurrent registrations for the same address cannot both succeed.
#[post("/register")]
pub async fn register(
    data: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();
    let fullname = request.fullname.trim().to_string();
    let email = normalize_email(&request.email);

    if fullname.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Full name, email and password are required".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let password = request.password;
    let password_hash = web::block(move || hash(password, BCRYPT_COST))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing task failed");
            AppError::RegistrationFailed
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            AppError::RegistrationFailed
        })?;

    let user_id: i32 = sqlx::query_scalar(
        "INSERT INTO users (fullname, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&fullname)
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(&data.db_pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            tracing::debug!(email = %email, "Registration rejected: email already registered");
            return AppError::Conflict("Email already exists".to_string());
        }
        tracing::error!(error = %e, "Failed to insert user");
        AppError::RegistrationFailed
    })?;

    tracing::info!(user_id, "User registered");

    Ok(HttpResponse::Ok().json(RegisterResponse {
        user_id,
        message: "Registration successful".to_string(),
    }))
}

/// Exchange email and password for a bearer token.
///
/// Unknown emails and wrong passwords produce the same 401, and both paths
/// pay for one bcrypt verification.
#[post("/login")]
pub async fn login(
    data: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();
    let email = normalize_email(&request.email);

    if email.is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let user = sqlx::query_as::<_, User>(
        "SELECT id, fullname, email, password_hash FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(&data.db_pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to look up user for login");
        AppError::LoginFailed
    })?;

    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let password = request.password;
    let verified = web::block(move || match stored_hash {
        Some(stored) => verify(password, &stored),
        None => {
            let _ = verify(password, dummy_hash());
            Ok(false)
        }
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Password verification task failed");
        AppError::LoginFailed
    })?
    .map_err(|e| {
        tracing::error!(error = %e, "Stored password hash could not be verified");
        AppError::LoginFailed
    })?;

    let user = match user {
        Some(user) if verified => user,
        _ => {
            tracing::debug!("Login rejected");
            return Err(AppError::InvalidCredentials);
        }
    };

    let identity = Identity {
        user_id: user.id,
        email: user.email.clone(),
    };
    let token = data
        .tokens
        .issue(&identity, Utc::now().timestamp())
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to sign token");
            AppError::LoginFailed
        })?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful".to_string(),
        user: UserSummary {
            id: user.id,
            fullname: user.fullname,
            email: user.email,
        },
        token,
    }))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION))
}

/// Hash checked against when the email is unknown, so that path costs the
/// same as a real verification.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash("shopfront-unknown-account", BCRYPT_COST).unwrap_or_default())
}
