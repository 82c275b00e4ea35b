// src/orders/order_transaction.rs

//! Order placement.
//!
//! A checkout writes one `orders` row and one `order_items` row per cart
//! line inside a single transaction. Either every row commits or none do.
//! Unit prices are read from the catalog inside the same transaction; the
//! client's prices are never used for the stored total.

use std::collections::HashMap;

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use thiserror::Error;

use super::orders_structs::{CheckoutRequest, ShippingInfo};

/// Upper bound on lines per order. Keeps the batched item insert well under
/// PostgreSQL's bind-parameter limit.
pub const MAX_CART_LINES: usize = 500;

/// Reasons a checkout request is rejected before touching storage.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Cart has too many lines (max {})", MAX_CART_LINES)]
    TooManyLines,
    #[error("Invalid product id {0}")]
    InvalidProduct(i32),
    #[error("Quantity for product {product_id} must be at least 1")]
    InvalidQuantity { product_id: i32 },
    #[error("Shipping information is required")]
    MissingShipping,
    #[error("Shipping {0} is required")]
    IncompleteShipping(&'static str),
    #[error("Shipping information could not be encoded")]
    Encoding(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("unknown product {0}")]
    UnknownProduct(i32),
    #[error("expected {expected} order items, wrote {written}")]
    IncompleteWrite { expected: usize, written: u64 },
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftLine {
    pub product_id: i32,
    pub quantity: i32,
    pub client_price: Option<f64>,
}

/// A validated checkout request, ready to be written.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    lines: Vec<DraftLine>,
    shipping_address: String,
}

impl OrderDraft {
    pub fn from_request(request: CheckoutRequest) -> Result<Self, DraftError> {
        if request.cart_items.is_empty() {
            return Err(DraftError::EmptyCart);
        }
        if request.cart_items.len() > MAX_CART_LINES {
            return Err(DraftError::TooManyLines);
        }

        let lines = request
            .cart_items
            .into_iter()
            .map(|item| {
                if item.product_id < 1 {
                    return Err(DraftError::InvalidProduct(item.product_id));
                }
                if item.quantity < 1 {
                    return Err(DraftError::InvalidQuantity {
                        product_id: item.product_id,
                    });
                }
                Ok(DraftLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    client_price: item.price,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let shipping = request.shipping_info.ok_or(DraftError::MissingShipping)?;
        validate_shipping(&shipping)?;

        Ok(Self {
            lines,
            shipping_address: serde_json::to_string(&shipping)?,
        })
    }

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    pub fn shipping_address(&self) -> &str {
        &self.shipping_address
    }

    /// Distinct product ids, in first-seen order.
    pub fn product_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            if !ids.contains(&line.product_id) {
                ids.push(line.product_id);
            }
        }
        ids
    }
}

fn validate_shipping(shipping: &ShippingInfo) -> Result<(), DraftError> {
    let required = [
        ("full name", &shipping.fullname),
        ("address", &shipping.address),
        ("city", &shipping.city),
        ("zip", &shipping.zip),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(DraftError::IncompleteShipping(field));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub lines: Vec<PricedLine>,
    pub total: BigDecimal,
}

/// Price every draft line from `catalog` and sum the total.
pub fn price_lines(
    draft: &OrderDraft,
    catalog: &HashMap<i32, BigDecimal>,
) -> Result<PricedOrder, CheckoutError> {
    let mut total = BigDecimal::from(0);
    let mut lines = Vec::with_capacity(draft.lines.len());

    for line in &draft.lines {
        let unit_price = catalog
            .get(&line.product_id)
            .cloned()
            .ok_or(CheckoutError::UnknownProduct(line.product_id))?;

        if let (Some(seen), Some(actual)) = (line.client_price, unit_price.to_f64()) {
            if (seen - actual).abs() > 0.005 {
                tracing::warn!(
                    product_id = line.product_id,
                    client_price = seen,
                    catalog_price = actual,
                    "Client price snapshot differs from catalog"
                );
            }
        }

        let subtotal = &unit_price * &BigDecimal::from(line.quantity);
        total += subtotal;
        lines.push(PricedLine {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price,
        });
    }

    Ok(PricedOrder { lines, total })
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: i32,
    pub total: BigDecimal,
    pub item_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Write `draft` as an order owned by `user_id`.
///
/// Commits on success. On any failure the transaction is rolled back before
/// the error is returned, so no order or item row survives. The pooled
/// connection goes back to the pool when the transaction is consumed or
/// dropped.
pub async fn place_order(
    pool: &PgPool,
    user_id: i32,
    draft: &OrderDraft,
) -> Result<PlacedOrder, CheckoutError> {
    let mut transaction = pool.begin().await?;

    match write_order(&mut transaction, user_id, draft).await {
        Ok(placed) => {
            transaction.commit().await?;
            Ok(placed)
        }
        Err(e) => {
            if let Err(rollback_err) = transaction.rollback().await {
                tracing::error!(error = %rollback_err, "Failed to roll back checkout transaction");
            }
            Err(e)
        }
    }
}

async fn write_order(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i32,
    draft: &OrderDraft,
) -> Result<PlacedOrder, CheckoutError> {
    // FOR SHARE keeps prices stable until commit
    let catalog: HashMap<i32, BigDecimal> = sqlx::query_as::<_, (i32, BigDecimal)>(
        "SELECT id, price FROM products WHERE id = ANY($1) FOR SHARE",
    )
    .bind(draft.product_ids())
    .fetch_all(&mut **tx)
    .await?
    .into_iter()
    .collect();

    let priced = price_lines(draft, &catalog)?;

    let (order_id, created_at) = sqlx::query_as::<_, (i32, DateTime<Utc>)>(
        "INSERT INTO orders (user_id, total, shipping_address) VALUES ($1, $2, $3) RETURNING id, created_at",
    )
    .bind(user_id)
    .bind(&priced.total)
    .bind(draft.shipping_address())
    .fetch_one(&mut **tx)
    .await?;

    let mut items = QueryBuilder::<Postgres>::new(
        "INSERT INTO order_items (order_id, product_id, quantity, price) ",
    );
    items.push_values(priced.lines.iter(), |mut row, line| {
        row.push_bind(order_id)
            .push_bind(line.product_id)
            .push_bind(line.quantity)
            .push_bind(line.unit_price.clone());
    });
    let written = items.build().execute(&mut **tx).await?.rows_affected();

    if written != priced.lines.len() as u64 {
        return Err(CheckoutError::IncompleteWrite {
            expected: priced.lines.len(),
            written,
        });
    }

    Ok(PlacedOrder {
        order_id,
        total: priced.total,
        item_count: priced.lines.len(),
        created_at,
    })
}
