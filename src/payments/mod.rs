use anyhow::Result;
use async_trait::async_trait;

pub mod bkash;

pub use bkash::{BkashClient, BkashConfig, BkashExecuteResponse, BkashPaymentResponse};

/// Tokenized-checkout payment gateway boundary. The production implementation
/// talks to bKash; tests substitute a mock.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Initiates a checkout session and returns the gateway payment id plus
    /// the URL the customer is redirected to.
    async fn create_payment(
        &self,
        amount: f64,
        order_number: &str,
        customer_phone: &str,
    ) -> Result<BkashPaymentResponse>;

    /// Finalizes a payment after the customer approves it at the gateway.
    async fn execute_payment(&self, payment_id: &str) -> Result<BkashExecuteResponse>;

    /// Server-side status lookup, used when a callback arrives without
    /// enough context to trust.
    async fn query_payment(&self, payment_id: &str) -> Result<BkashExecuteResponse>;

    async fn refund_payment(
        &self,
        payment_id: &str,
        trx_id: &str,
        amount: f64,
        reason: &str,
    ) -> Result<BkashExecuteResponse>;
}
