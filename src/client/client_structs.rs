// src/client/client_structs.rs

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::orders::orders_structs::CheckoutRequest;

/// A cart line kept on the shopper's device. Never authoritative: the
/// server only trusts the product id and quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "id")]
    pub product_id: i32,
    pub name: String,
    /// Unit price when the item was added, for display.
    pub price: BigDecimal,
    pub quantity: i32,
}

/// The signed-in shopper, as returned by login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: i32,
    pub fullname: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// Where the UI should navigate after showing a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Home,
    Login,
}

/// A transient, dismissible message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub redirect: Option<Redirect>,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
            redirect: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
            redirect: None,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
            redirect: None,
        }
    }

    #[must_use]
    pub fn then(mut self, redirect: Redirect) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Authentication failed or is missing; send the shopper to log in.
    pub fn login_required(text: impl Into<String>) -> Self {
        Self::error(text).then(Redirect::Login)
    }
}

/// A checkout ready to send: bearer token plus request body.
#[derive(Debug, Clone)]
pub struct PendingCheckout {
    pub bearer_token: String,
    pub body: CheckoutRequest,
}

impl PendingCheckout {
    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.bearer_token)
    }
}
