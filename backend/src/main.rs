//! Backend entry-point: loads settings, connects persistence, and serves the
//! REST API, WebSocket feed, and OpenAPI docs.

mod server;

use std::time::Duration;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use lifelink::inbound::http::health::HealthState;
use lifelink::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use lifelink::outbound::security::{BuildMode, token_key_from_env};
use lifelink::settings::LifelinkSettings;
use server::{ServerConfig, create_server};

const DB_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = LifelinkSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;

    let token_key = token_key_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(fingerprint = %token_key.fingerprint(), "token signing key loaded");

    let mut config = ServerConfig::new(bind_addr, token_key, settings.clone());
    if let Some(pool) = connect_database(&settings).await? {
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "LifeLink backend listening");
    server.await
}

/// Apply migrations and open the pool when a database URL is configured.
async fn connect_database(settings: &LifelinkSettings) -> std::io::Result<Option<DbPool>> {
    let Some(url) = settings.database_url() else {
        return Ok(None);
    };
    run_pending_migrations(url)
        .await
        .map_err(std::io::Error::other)?;
    let pool = DbPool::new(PoolConfig::new(url).with_connection_timeout(DB_CONNECT_TIMEOUT))
        .await
        .map_err(std::io::Error::other)?;
    Ok(Some(pool))
}
