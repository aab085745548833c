use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chat::ProductSummary;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAddRequest {
    pub product_id: Uuid,
    pub quantity: u32,
    pub size: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartUpdateRequest {
    pub product_id: Uuid,
    pub quantity: i64,
    pub size: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRemoveRequest {
    pub product_id: Uuid,
    pub size: String,
    pub color: String,
}

/// Cart line with its product populated for display. `product` is `None`
/// when the product has since been removed from the catalog.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductSummary>,
    pub product_id: Uuid,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    pub price: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: Uuid,
    pub items: Vec<CartItemView>,
    pub total_amount: f64,
    pub updated_at: DateTime<Utc>,
}
