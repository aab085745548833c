use anyhow::anyhow;

use crate::payments::bkash::BkashConfig;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    /// When absent the server falls back to the offline keyword classifier.
    pub groq_api_key: Option<String>,
    pub groq_api_base: String,
    pub groq_model: String,
    /// Base URL of the storefront UI, used for payment redirect callbacks.
    pub frontend_url: String,
    pub bkash: BkashConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self, anyhow::Error> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| anyhow!("DATABASE_URL not found"))?;

        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| anyhow!("JWT_SECRET not found"))?;

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let groq_api_key = std::env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty());

        let groq_api_base = std::env::var("GROQ_API_BASE")
            .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string());

        let groq_model = std::env::var("GROQ_MODEL")
            .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string());

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let bkash = BkashConfig {
            base_url: std::env::var("BKASH_BASE_URL").unwrap_or_default(),
            app_key: std::env::var("BKASH_APP_KEY").unwrap_or_default(),
            app_secret: std::env::var("BKASH_APP_SECRET").unwrap_or_default(),
            username: std::env::var("BKASH_USERNAME").unwrap_or_default(),
            password: std::env::var("BKASH_PASSWORD").unwrap_or_default(),
            callback_url: std::env::var("BKASH_WEBHOOK_URL").unwrap_or_default(),
        };

        Ok(AppConfig {
            database_url,
            jwt_secret,
            port,
            groq_api_key,
            groq_api_base,
            groq_model,
            frontend_url,
            bkash,
        })
    }
}
