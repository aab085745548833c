use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::intent::ChatEntities;
use crate::models::{Category, Gender, Product};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// One dialogue turn's reply. `products` is present only for browse results;
/// `cart_updated` tells the UI to refetch the cart.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub intent: String,
    pub entities: ChatEntities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<ProductSummary>>,
    pub cart_updated: bool,
    pub session_id: String,
}

/// Catalog projection sent to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub image: String,
    pub category: Category,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: i32,
    pub gender: Gender,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        ProductSummary {
            id: product.id,
            name: product.name.clone(),
            brand: product.brand.clone(),
            price: product.price,
            image: product.image.clone(),
            category: product.category,
            sizes: product.sizes.clone(),
            colors: product.colors.clone(),
            stock: product.stock,
            gender: product.gender,
        }
    }
}
