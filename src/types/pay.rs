use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{PaymentMethod, ShippingAddress};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub customer_phone: Option<String>,
}

/// Checkout result. `payment_url` is present only for gateway payments and
/// is where the customer must be redirected to approve the charge.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutData {
    pub order_id: Uuid,
    pub order_number: String,
    pub total_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(rename = "paymentID", default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentData {
    pub payment_status: crate::models::PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

/// Query string bKash appends to the redirect callback.
#[derive(Debug, Deserialize)]
pub struct WebhookQuery {
    #[serde(rename = "paymentID", default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
