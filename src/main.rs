use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shoebot::chat::{Dispatcher, GroqClassifier, IntentClassifier, KeywordClassifier};
use shoebot::middleware::Authentication;
use shoebot::payments::{BkashClient, PaymentGateway};
use shoebot::routes;
use shoebot::store::{PgStore, Store};
use shoebot::{AppConfig, AppState};

#[actix_web::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(AppConfig::new()?);

    let pg = PgStore::connect(&config.database_url).await?;
    pg.migrate().await?;
    let store: Arc<dyn Store> = Arc::new(pg);

    let classifier: Arc<dyn IntentClassifier> = match &config.groq_api_key {
        Some(key) => Arc::new(GroqClassifier::new(
            key,
            &config.groq_api_base,
            &config.groq_model,
        )),
        None => {
            warn!("GROQ_API_KEY not set, falling back to the keyword classifier");
            Arc::new(KeywordClassifier)
        }
    };

    let gateway: Arc<dyn PaymentGateway> = Arc::new(BkashClient::new(config.bkash.clone()));
    let dispatcher = Dispatcher::new(store.clone(), classifier);

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        gateway,
        dispatcher,
    });

    let port = config.port;
    info!("Starting server on port {}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Authentication {
                app_config: state.config.clone(),
            })
            .wrap(Cors::permissive())
            .service(routes::health)
            .service(web::scope("/api").configure(routes::configure))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    Ok(())
}
