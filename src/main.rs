//! Benefit engine HTTP server.
//!
//! Reads config from env vars:
//!   BENEFIT_CONFIG_DIR  configuration directory (default: ./config/vr_va)
//!   BIND_ADDR           listen address (default: 0.0.0.0:3000)
//!   RUST_LOG            log filter (default: info)

use std::process::ExitCode;

use benefit_engine::api::{AppState, create_router};
use benefit_engine::config::ConfigLoader;
use tokio::net::TcpListener;
use tracing::{error, info};

const DEFAULT_CONFIG_DIR: &str = "./config/vr_va";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,benefit_engine=debug".into()),
        )
        .init();

    let config_dir =
        std::env::var("BENEFIT_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.into());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());

    let config = match ConfigLoader::load(&config_dir) {
        Ok(config) => config,
        Err(err) => {
            error!(config_dir = %config_dir, error = %err, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let router = create_router(AppState::new(config));

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(bind_addr = %bind_addr, error = %err, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };
    info!(bind_addr = %bind_addr, "Benefit engine listening");

    if let Err(err) = axum::serve(listener, router).await {
        error!(error = %err, "Server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
