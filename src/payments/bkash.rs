use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::PaymentGateway;

#[derive(Clone, Default)]
pub struct BkashConfig {
    pub base_url: String,
    pub app_key: String,
    pub app_secret: String,
    pub username: String,
    pub password: String,
    /// Where the gateway sends the customer back after approving or
    /// cancelling the payment.
    pub callback_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BkashPaymentResponse {
    #[serde(rename = "paymentID")]
    pub payment_id: String,
    #[serde(rename = "bkashURL")]
    pub bkash_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BkashExecuteResponse {
    #[serde(rename = "paymentID", default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(rename = "trxID", default, skip_serializing_if = "Option::is_none")]
    pub trx_id: Option<String>,
    #[serde(rename = "transactionStatus", default, skip_serializing_if = "Option::is_none")]
    pub transaction_status: Option<String>,
    #[serde(rename = "statusCode", default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,
    #[serde(rename = "statusMessage", default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(rename = "refundTrxID", default, skip_serializing_if = "Option::is_none")]
    pub refund_trx_id: Option<String>,
}

impl BkashExecuteResponse {
    pub fn is_completed(&self) -> bool {
        self.transaction_status.as_deref() == Some("Completed")
    }
}

#[derive(Debug, Deserialize)]
struct TokenGrantResponse {
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(rename = "statusMessage", default)]
    status_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    #[serde(rename = "paymentID", default)]
    payment_id: Option<String>,
    #[serde(rename = "bkashURL", default)]
    bkash_url: Option<String>,
    #[serde(rename = "statusMessage", default)]
    status_message: Option<String>,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// bKash tokenized-checkout client. Grant tokens are cached and refreshed
/// five minutes before the advertised expiry.
pub struct BkashClient {
    http: reqwest::Client,
    config: BkashConfig,
    token: Mutex<Option<CachedToken>>,
}

impl BkashClient {
    pub fn new(config: BkashConfig) -> Self {
        BkashClient {
            http: reqwest::Client::new(),
            config,
            token: Mutex::new(None),
        }
    }

    async fn grant_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.token.clone());
            }
        }

        let grant: TokenGrantResponse = self
            .http
            .post(format!(
                "{}/tokenized/checkout/token/grant",
                self.config.base_url
            ))
            .header("username", &self.config.username)
            .header("password", &self.config.password)
            .json(&serde_json::json!({
                "app_key": self.config.app_key,
                "app_secret": self.config.app_secret,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let token = grant.id_token.ok_or_else(|| {
            anyhow!(
                "bKash token grant failed: {}",
                grant.status_message.unwrap_or_else(|| "no id_token".to_string())
            )
        })?;

        let ttl = grant.expires_in.unwrap_or(3600).saturating_sub(300);
        *guard = Some(CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + Duration::from_secs(ttl),
        });
        Ok(token)
    }

    async fn post_authorized(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<BkashExecuteResponse> {
        let token = self.grant_token().await?;
        let response = self
            .http
            .post(format!("{}{}", self.config.base_url, path))
            .header("authorization", token)
            .header("x-app-key", &self.config.app_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl PaymentGateway for BkashClient {
    async fn create_payment(
        &self,
        amount: f64,
        order_number: &str,
        customer_phone: &str,
    ) -> Result<BkashPaymentResponse> {
        let token = self.grant_token().await?;
        let response: CreateResponse = self
            .http
            .post(format!("{}/tokenized/checkout/create", self.config.base_url))
            .header("authorization", token)
            .header("x-app-key", &self.config.app_key)
            .json(&serde_json::json!({
                "mode": "0011",
                "payerReference": customer_phone,
                "callbackURL": self.config.callback_url,
                "amount": format!("{amount:.2}"),
                "currency": "BDT",
                "intent": "sale",
                "merchantInvoiceNumber": order_number,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match (response.payment_id, response.bkash_url) {
            (Some(payment_id), Some(bkash_url)) => {
                debug!("bKash payment created: {}", payment_id);
                Ok(BkashPaymentResponse {
                    payment_id,
                    bkash_url,
                })
            }
            _ => Err(anyhow!(
                "bKash create payment failed: {}",
                response
                    .status_message
                    .unwrap_or_else(|| "no paymentID in response".to_string())
            )),
        }
    }

    async fn execute_payment(&self, payment_id: &str) -> Result<BkashExecuteResponse> {
        self.post_authorized(
            "/tokenized/checkout/execute",
            serde_json::json!({ "paymentID": payment_id }),
        )
        .await
    }

    async fn query_payment(&self, payment_id: &str) -> Result<BkashExecuteResponse> {
        self.post_authorized(
            "/tokenized/checkout/payment/status",
            serde_json::json!({ "paymentID": payment_id }),
        )
        .await
    }

    async fn refund_payment(
        &self,
        payment_id: &str,
        trx_id: &str,
        amount: f64,
        reason: &str,
    ) -> Result<BkashExecuteResponse> {
        self.post_authorized(
            "/tokenized/checkout/payment/refund",
            serde_json::json!({
                "paymentID": payment_id,
                "amount": format!("{amount:.2}"),
                "trxID": trx_id,
                "sku": "shoes",
                "reason": reason,
            }),
        )
        .await
    }
}
