use super::*;

pub async fn grant_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<RoleGrantRequest>,
) -> ApiResult<StatusCode> {
    let grant = payload.grant_payload().to_grant()?;

    state
        .security_admin_service
        .grant(payload.role_name.as_str(), &grant.resource, grant.action)
        .await?;

    tracing::info!(
        actor = %user.user_id(),
        role = %payload.role_name,
        grant = %grant,
        "permission granted through api"
    );
    Ok(StatusCode::NO_CONTENT)
}

pub async fn revoke_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<RoleGrantRequest>,
) -> ApiResult<StatusCode> {
    let grant = payload.grant_payload().to_grant()?;

    state
        .security_admin_service
        .revoke(payload.role_name.as_str(), &grant.resource, grant.action)
        .await?;

    tracing::info!(
        actor = %user.user_id(),
        role = %payload.role_name,
        grant = %grant,
        "permission revoked through api"
    );
    Ok(StatusCode::NO_CONTENT)
}

pub async fn invalidate_cache_handler(State(state): State<AppState>) -> StatusCode {
    state.security_admin_service.invalidate_cache().await;
    StatusCode::NO_CONTENT
}
