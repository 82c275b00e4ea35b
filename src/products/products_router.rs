// src/products/products_router.rs

use actix_web::{get, web, HttpResponse};

use super::products_structs::Product;
use crate::shared::error::{AppError, Result};
use crate::AppState;

const PRODUCT_COLUMNS: &str = "id, name, description, price, image_url, is_featured";

/// `GET /api/products`: the whole catalog.
#[get("/products")]
pub async fn list_products(data: web::Data<AppState>) -> Result<HttpResponse> {
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
    ))
    .fetch_all(&data.db_pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch products");
        AppError::CatalogUnavailable
    })?;

    Ok(HttpResponse::Ok().json(products))
}

/// `GET /api/products/featured`: products flagged for the landing page.
#[get("/products/featured")]
pub async fn list_featured_products(data: web::Data<AppState>) -> Result<HttpResponse> {
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_featured = TRUE ORDER BY id"
    ))
    .fetch_all(&data.db_pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch featured products");
        AppError::CatalogUnavailable
    })?;

    Ok(HttpResponse::Ok().json(products))
}

/// `GET /api/products/{id}`.
#[get("/products/{id}")]
pub async fn get_product(data: web::Data<AppState>, path: web::Path<i32>) -> Result<HttpResponse> {
    let id = path.into_inner();
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&data.db_pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, product_id = id, "Failed to fetch product");
        AppError::CatalogUnavailable
    })?;

    product
        .map(|p| HttpResponse::Ok().json(p))
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}
