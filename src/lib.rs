// src/lib.rs

//! Storefront API: product catalog, account registration and login, and a
//! transactional checkout, plus the client-side cart/session store the
//! storefront pages use.

use actix_web::error::{JsonPayloadError, PathError};
use actix_web::{web, HttpRequest};
use sqlx::PgPool;

pub mod client;
pub mod config;
pub mod orders;
pub mod products;
pub mod shared;
pub mod users;

use orders::orders_router;
use products::products_router;
use shared::error::AppError;
use shared::spa_fallback::api_not_found;
use users::token::TokenSigner;
use users::users_router;

/// State shared by every worker: the connection pool and the token signer.
pub struct AppState {
    pub db_pool: PgPool,
    pub tokens: TokenSigner,
}

/// Register every `/api` route. Unknown `/api/*` paths get a JSON 404 so
/// they never fall through to the storefront entry page.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(web::PathConfig::default().error_handler(path_error))
            // Catalog
            .service(products_router::list_products)
            .service(products_router::list_featured_products)
            .service(products_router::get_product)
            // Accounts
            .service(users_router::register)
            .service(users_router::login)
            // Orders
            .service(orders_router::checkout)
            .default_service(web::route().to(api_not_found)),
    );
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected request body");
    AppError::Validation("Malformed request body".to_string()).into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected path parameter");
    AppError::NotFound("Product not found".to_string()).into()
}
