use std::sync::Arc;

use fxtrader::config::AppConfig;
use fxtrader::llm::AiGateway;
use fxtrader::services::config::{ConfigStore, MemoryConfigStore, PgConfigStore};
use fxtrader::state::AppState;
use fxtrader::{db, routes};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, "failed to load .env");
        }
    }

    let config = AppConfig::from_env();
    tracing::debug!(?config, "configuration loaded");

    let store: Arc<dyn ConfigStore> = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = db::init_pool(database_url, config.db_max_connections).await?;
            tracing::info!("ai config store: postgres");
            Arc::new(PgConfigStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; ai config is kept in memory and lost on restart");
            Arc::new(MemoryConfigStore::new())
        }
    };

    let gateway = AiGateway::new(&config.gateway)?;
    let state = AppState::new(Arc::new(gateway), store, config.analysis);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(port = config.port, "fxtrader listening");
    axum::serve(listener, app).await?;
    Ok(())
}
