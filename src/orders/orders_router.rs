// src/orders/orders_router.rs

use actix_web::{post, rt, web, HttpResponse};

use super::order_transaction::{place_order, CheckoutError, OrderDraft};
use super::orders_structs::{CheckoutRequest, CheckoutResponse};
use crate::shared::error::{AppError, Result};
use crate::users::auth_middleware::AuthenticatedUser;
use crate::AppState;

/// `POST /api/checkout`: place an order for the authenticated user.
///
/// Steps:
/// 1. The auth gate rejects missing (401) or bad (403) tokens.
/// 2. The cart and shipping info are validated; nothing is written for a
///    rejected request.
/// 3. The order transaction runs on its own task, so a client that
///    disconnects mid-request does not abandon it halfway.
/// 4. Commit returns the new order id; any failure rolls back everything.
#[post("/checkout")]
pub async fn checkout(
    user: AuthenticatedUser,
    data: web::Data<AppState>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse> {
    let draft = OrderDraft::from_request(body.into_inner()).map_err(|e| {
        tracing::debug!(user_id = user.user_id, error = %e, "Checkout rejected");
        AppError::Validation(e.to_string())
    })?;

    let pool = data.db_pool.clone();
    let user_id = user.user_id;
    let outcome = rt::spawn(async move { place_order(&pool, user_id, &draft).await })
        .await
        .map_err(|e| {
            tracing::error!(user_id, error = %e, "Checkout task aborted");
            AppError::CheckoutFailed
        })?;

    let placed = outcome.map_err(|e| match e {
        CheckoutError::UnknownProduct(product_id) => {
            tracing::warn!(user_id, product_id, "Checkout referenced unknown product");
            AppError::Validation(format!("Unknown product {product_id}"))
        }
        other => {
            tracing::error!(user_id, error = %other, "Checkout transaction rolled back");
            AppError::CheckoutFailed
        }
    })?;

    tracing::info!(
        user_id,
        order_id = placed.order_id,
        items = placed.item_count,
        total = %placed.total,
        created_at = %placed.created_at,
        "Order placed"
    );

    Ok(HttpResponse::Ok().json(CheckoutResponse {
        message: "Order placed successfully!".to_string(),
        order_id: placed.order_id,
        total: placed.total,
    }))
}
