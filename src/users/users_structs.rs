// src/users/users_structs.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account row. The password is only ever held as a bcrypt hash.
#[derive(Debug, FromRow)]
pub struct User {
    pub id: i32,
    pub fullname: String,
    pub email: String,
    pub password_hash: String,
}

/// Body of `POST /api/register`. Missing fields deserialize as blank and
/// are rejected by validation.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(rename = "userId")]
    pub user_id: i32,
    pub message: String,
}

/// Body of `POST /api/login`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public view of an account, returned on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i32,
    pub fullname: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserSummary,
    pub token: String,
}

/// Emails are compared case-insensitively and without surrounding space.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@X.com "), "a@x.com");
    }

    #[test]
    fn test_register_response_wire_names() {
        let json = serde_json::to_value(RegisterResponse {
            user_id: 7,
            message: "Registration successful".into(),
        })
        .unwrap();
        assert_eq!(json["userId"], 7);
    }

    #[test]
    fn test_register_request_missing_fields_are_blank() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert!(req.fullname.is_empty());
        assert!(req.password.is_empty());
    }
}
