//! Atrium console API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod middleware;
mod sessions;
mod state;

use std::sync::Arc;

use atrium_core::AppError;
use atrium_domain::LayoutCatalog;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::sessions::{SessionRegistry, spawn_idle_pruning};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let http_client = reqwest::Client::builder()
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build http client: {error}")))?;
    let sessions = Arc::new(SessionRegistry::new(
        http_client,
        config.permissions_endpoint.clone(),
        config.permissions_fetch_timeout,
    ));
    let _idle_pruning = (!config.session_idle_timeout.is_zero())
        .then(|| spawn_idle_pruning(sessions.clone(), config.session_idle_timeout));

    let app_state = AppState {
        sessions,
        layout_catalog: Arc::new(LayoutCatalog::builtin()),
    };
    let app = api_router::build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(
        %address,
        permissions_endpoint = %config.permissions_endpoint,
        fetch_timeout = ?config.permissions_fetch_timeout,
        "atrium-api listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
