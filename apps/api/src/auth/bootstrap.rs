use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use rentops_core::{AppError, UserIdentity};
use rentops_domain::SystemRole;
use sha2::{Digest, Sha256};
use tower_sessions::Session;
use tracing::info;

use crate::dto::BootstrapRequest;
use crate::error::ApiResult;
use crate::state::AppState;

use super::{SESSION_CREATED_AT_KEY, SESSION_USER_KEY};

pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<StatusCode> {
    if !bootstrap_token_matches(&payload.token, &state.bootstrap_token) {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let user_id = payload.user_id();
    let account = state
        .account_repository
        .find_user(user_id)
        .await?
        .filter(|account| account.is_active)
        .ok_or_else(|| AppError::Unauthorized(format!("user '{user_id}' cannot sign in")))?;

    // Highest system role held; consulted only when route mappings are unavailable.
    let declared_role = state
        .authorization_service
        .effective_permissions(user_id)
        .await?
        .and_then(|set| {
            SystemRole::all()
                .iter()
                .find(|role| set.has_role(role.as_str()))
                .map(|role| role.as_str().to_owned())
        });

    let identity = UserIdentity::new(account.id, account.name, Some(account.email), declared_role);

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    session
        .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session creation time: {error}"))
        })?;

    info!(
        user_id = %identity.user_id(),
        declared_role = ?identity.declared_role(),
        "bootstrap session established"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Compares SHA-256 digests of both tokens without short-circuiting, so the
/// comparison time depends on neither the length nor the content of the input.
fn bootstrap_token_matches(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    provided
        .iter()
        .zip(expected.iter())
        .fold(0_u8, |difference, (left, right)| difference | (left ^ right))
        == 0
}
