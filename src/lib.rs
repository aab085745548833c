use std::sync::Arc;

pub mod chat;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod payments;
pub mod prompts;
pub mod routes;
pub mod store;
pub mod types;

pub use config::AppConfig;

use chat::dispatcher::Dispatcher;
use payments::PaymentGateway;
use store::Store;

/// Shared application state handed to every route handler.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub dispatcher: Dispatcher,
}
