//! RentOps permission service composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use rentops_core::AppError;
use tracing::info;

use crate::api_config::{ApiCommand, ApiConfig, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{build_app_state, build_postgres_session_layer, connect_and_migrate};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let pool = connect_and_migrate(&config.database_url).await?;

    match config.command {
        ApiCommand::Migrate => {
            info!("migrations applied");
            return Ok(());
        }
        ApiCommand::SeedRoles => {
            let app_state = build_app_state(pool, &config)?;
            let summary = app_state.security_admin_service.seed_system_roles().await?;
            info!(
                roles = summary.roles,
                grants_inserted = summary.grants_inserted,
                "system roles seeded"
            );
            return Ok(());
        }
        ApiCommand::Serve => {}
    }

    let session_layer = build_postgres_session_layer(pool.clone(), config.cookie_secure).await?;
    let app_state = build_app_state(pool, &config)?;
    let app = build_router(app_state, &config.frontend_url, session_layer)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind API listener: {error}")))?;

    info!(%address, "rentops api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server failed: {error}")))
}
