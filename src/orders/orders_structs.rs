// src/orders/orders_structs.rs

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// One cart line as submitted by the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemPayload {
    pub product_id: i32,
    pub quantity: i32,
    /// Price the shopper saw. Informational only; orders are priced from
    /// the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// Where the order ships. Stored as serialized JSON on the order row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub cart_items: Vec<CartItemPayload>,
    #[serde(default)]
    pub shipping_info: Option<ShippingInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub message: String,
    #[serde(rename = "orderId")]
    pub order_id: i32,
    pub total: BigDecimal,
}
