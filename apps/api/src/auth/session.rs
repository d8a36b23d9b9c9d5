use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use rentops_core::{AppError, UserIdentity};
use tower_sessions::Session;
use tracing::info;

use crate::dto::CurrentUserResponse;
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    let user_id = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .map(|identity| identity.user_id());

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    if let Some(user_id) = user_id {
        info!(user_id = %user_id, "session closed");
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<CurrentUserResponse>> {
    let permission_set = state
        .authorization_service
        .effective_permissions(identity.user_id())
        .await?;
    let accessible_routes = state
        .route_access_service
        .accessible_routes(&identity)
        .await;

    Ok(Json(CurrentUserResponse::new(
        identity,
        permission_set,
        accessible_routes,
    )))
}
