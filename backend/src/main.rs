//! Backend entry-point: loads settings, connects to PostgreSQL, and serves
//! the REST API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use qa_backend::inbound::http::health::HealthState;
use qa_backend::outbound::persistence::{DbPool, PoolConfig};
use server::{AppSettings, BuildMode, ServerConfig, create_server, load_token_secret};

fn config_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("invalid configuration: {err}"))
}

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

    let settings = AppSettings::load().map_err(config_error)?;
    let mode = BuildMode::from_debug_assertions();

    let bind_addr = settings.bind_addr().map_err(config_error)?;
    let token_cookie = settings.token_cookie().map_err(config_error)?;
    let token_secret = load_token_secret(
        settings.token_secret_file(),
        mode,
        settings.allow_ephemeral_secret,
    )
    .map_err(config_error)?;
    let database_url = settings.database_url().map_err(config_error)?;
    let db_pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state,
        ServerConfig::new(bind_addr, db_pool, token_secret, token_cookie),
    )?;
    info!(%bind_addr, "listening");

    server.await
}
