use std::str::FromStr;

use rentops_application::CreateRoleInput;
use rentops_domain::PermissionName;

use super::*;

pub async fn list_roles_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .security_admin_service
        .list_roles()
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let permissions = payload
        .permissions
        .iter()
        .map(|value| PermissionName::from_str(value.as_str()))
        .collect::<Result<Vec<_>, _>>()?;

    let role = state
        .security_admin_service
        .create_role(CreateRoleInput {
            name: payload.name,
            permissions,
        })
        .await?;

    tracing::info!(actor = %user.user_id(), role = %role.name, "role created through api");
    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}
