use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod ai;
mod commands;
mod config;
mod db;
mod error;
mod models;
mod routes;
mod state;
mod store;
mod utils;

#[cfg(test)]
mod integration_tests;

use ai::{CompletionGateway, HttpGateway};
use config::{AppConfig, StoreKind};
use error::{LeafError, LeafResult};
use state::AppState;
use store::{MemoryStore, PgStore, Store};

async fn build_store(cfg: &AppConfig) -> LeafResult<Arc<dyn Store>> {
    match cfg.store {
        StoreKind::Memory => {
            tracing::warn!("DATA_STORE=memory: readings and predictions are not persisted");
            Ok(Arc::new(MemoryStore::with_default_zones()?))
        }
        StoreKind::Postgres => {
            let pool = db::init_pool(&cfg.database_url).await?;
            db::init_database(&pool).await?;
            tracing::info!("Database connection established");
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}

async fn run() -> LeafResult<()> {
    let cfg = AppConfig::from_env()?;
    tracing::info!(
        "Config loaded (store={:?}, port={}, ai_model={}, ai_key_configured={})",
        cfg.store,
        cfg.port,
        cfg.gateway.model,
        cfg.gateway.api_key.is_some()
    );
    if cfg.gateway.api_key.is_none() {
        tracing::warn!("AI_API_KEY not set; predictions will use fallback values");
    }

    let store = build_store(&cfg).await?;
    let gateway: Arc<dyn CompletionGateway> =
        Arc::new(HttpGateway::new(cfg.gateway.clone()).map_err(LeafError::Upstream)?);
    let app_state = AppState::new(store, gateway, cfg.client.clone());

    let app = routes::app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Leafwatch backend {}...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run().await {
        tracing::error!("fatal: {}", e);
        std::process::exit(1);
    }
}
