//! Weighbridge process lock service.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use tracing::info;
use weighbridge_application::LockArbiterService;
use weighbridge_core::AppError;
use weighbridge_infrastructure::InMemoryLockRecordRepository;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let lock_arbiter = LockArbiterService::new(
        Arc::new(InMemoryLockRecordRepository::new()),
        config.lock_ttl_minutes,
    )?;

    let app_state = AppState {
        lock_arbiter,
        token_identities: Arc::new(config.token_identities.clone()),
    };
    let app = api_router::build_router(app_state);

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(
        %address,
        ttl_min = config.lock_ttl_minutes,
        operators = config.token_identities.len(),
        "weighbridge-lock-api listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
