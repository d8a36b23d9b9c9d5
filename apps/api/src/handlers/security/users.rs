use rentops_core::UserId;

use super::*;

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Json(payload): Json<RoleAssignmentRequest>,
) -> ApiResult<StatusCode> {
    state
        .security_admin_service
        .assign_role(payload.user_id(), payload.role_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn unassign_role_handler(
    State(state): State<AppState>,
    Json(payload): Json<RoleAssignmentRequest>,
) -> ApiResult<StatusCode> {
    state
        .security_admin_service
        .unassign_role(payload.user_id(), payload.role_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_user_status_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserStatusRequest>,
) -> ApiResult<StatusCode> {
    let user_id = UserId::new(user_id);
    state
        .security_admin_service
        .set_user_active(user_id, payload.is_active)
        .await?;

    tracing::info!(
        actor = %user.user_id(),
        user_id = %user_id,
        is_active = payload.is_active,
        "user status changed through api"
    );
    Ok(StatusCode::NO_CONTENT)
}
