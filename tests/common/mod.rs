#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use uuid::Uuid;

use shoebot::chat::intent::IntentResult;
use shoebot::chat::{Dispatcher, IntentClassifier};
use shoebot::models::{Category, Gender, Product, User, UserAddress};
use shoebot::payments::{
    BkashConfig, BkashExecuteResponse, BkashPaymentResponse, PaymentGateway,
};
use shoebot::store::MemoryStore;
use shoebot::{AppConfig, AppState};

pub const JWT_SECRET: &str = "test-secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://localhost/unused".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        port: 0,
        groq_api_key: None,
        groq_api_base: String::new(),
        groq_model: String::new(),
        frontend_url: "http://localhost:3000".to_string(),
        bkash: BkashConfig::default(),
    }
}

/// Gateway double. `fail_create` simulates an outage during checkout;
/// `execute_status` is the transaction status every execute/query reports.
pub struct MockGateway {
    pub fail_create: bool,
    pub execute_status: &'static str,
}

impl Default for MockGateway {
    fn default() -> Self {
        MockGateway {
            fail_create: false,
            execute_status: "Completed",
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_payment(
        &self,
        _amount: f64,
        order_number: &str,
        _customer_phone: &str,
    ) -> Result<BkashPaymentResponse> {
        if self.fail_create {
            return Err(anyhow!("gateway unavailable"));
        }
        Ok(BkashPaymentResponse {
            payment_id: format!("TR-{order_number}"),
            bkash_url: "https://pay.example/checkout".to_string(),
        })
    }

    async fn execute_payment(&self, payment_id: &str) -> Result<BkashExecuteResponse> {
        Ok(BkashExecuteResponse {
            payment_id: Some(payment_id.to_string()),
            trx_id: Some("TRX123".to_string()),
            transaction_status: Some(self.execute_status.to_string()),
            ..BkashExecuteResponse::default()
        })
    }

    async fn query_payment(&self, payment_id: &str) -> Result<BkashExecuteResponse> {
        self.execute_payment(payment_id).await
    }

    async fn refund_payment(
        &self,
        payment_id: &str,
        trx_id: &str,
        _amount: f64,
        _reason: &str,
    ) -> Result<BkashExecuteResponse> {
        Ok(BkashExecuteResponse {
            payment_id: Some(payment_id.to_string()),
            trx_id: Some(trx_id.to_string()),
            refund_trx_id: Some("REF123".to_string()),
            transaction_status: Some("Completed".to_string()),
            ..BkashExecuteResponse::default()
        })
    }
}

/// Classifier double keyed on the exact user message.
pub struct ScriptedClassifier {
    pub script: HashMap<String, IntentResult>,
}

impl ScriptedClassifier {
    pub fn new(turns: Vec<(&str, IntentResult)>) -> Self {
        ScriptedClassifier {
            script: turns
                .into_iter()
                .map(|(m, r)| (m.to_string(), r))
                .collect(),
        }
    }
}

#[async_trait]
impl IntentClassifier for ScriptedClassifier {
    async fn classify(&self, message: &str, _context: &str) -> IntentResult {
        self.script
            .get(message)
            .cloned()
            .unwrap_or_else(IntentResult::fallback)
    }

    async fn answer(&self, _message: &str) -> Option<String> {
        None
    }
}

pub fn app_state(
    store: Arc<MemoryStore>,
    gateway: Arc<dyn PaymentGateway>,
    classifier: Arc<dyn IntentClassifier>,
) -> Arc<AppState> {
    let dispatcher = Dispatcher::new(store.clone(), classifier);
    Arc::new(AppState {
        config: Arc::new(test_config()),
        store,
        gateway,
        dispatcher,
    })
}

pub fn air_max() -> Product {
    Product {
        id: Uuid::new_v4(),
        name: "Nike Air Max Classic".to_string(),
        description: "Iconic cushioned runner".to_string(),
        price: 129.99,
        image: "airmax.jpg".to_string(),
        category: Category::Sneakers,
        sizes: vec!["8".to_string(), "9".to_string(), "10".to_string()],
        colors: vec!["Black".to_string(), "White".to_string()],
        stock: 5,
        brand: "Nike".to_string(),
        gender: Gender::Unisex,
    }
}

pub fn user_with_address(id: Uuid) -> User {
    User {
        id,
        email: "ava@example.com".to_string(),
        name: "Ava Rahman".to_string(),
        phone: Some("01711111111".to_string()),
        shipping_address: Some(UserAddress {
            street: "12 Lake Rd".to_string(),
            city: "Dhaka".to_string(),
            state: "Dhaka".to_string(),
            zip_code: "1207".to_string(),
            country: Some("Bangladesh".to_string()),
        }),
    }
}
