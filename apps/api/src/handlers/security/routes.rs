use std::collections::HashMap;

use rentops_domain::RoutePolicy;

use super::*;

pub async fn list_route_permissions_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RoutePermissionResponse>>> {
    let overrides = state
        .route_access_service
        .list_overrides()
        .await?
        .into_iter()
        .map(|value| (value.route_key, value.grant))
        .collect::<HashMap<_, _>>();

    let routes = RoutePolicy::all()
        .iter()
        .map(|policy| {
            let (grant, overridden) = match overrides.get(policy.key()) {
                Some(grant) => (grant, true),
                None => (policy.grant(), false),
            };

            RoutePermissionResponse {
                route_key: policy.key().to_owned(),
                action: grant.action.as_str().to_owned(),
                resource: grant.resource.as_str().to_owned(),
                overridden,
            }
        })
        .collect();

    Ok(Json(routes))
}

pub async fn save_route_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(route_key): Path<String>,
    Json(payload): Json<GrantPayload>,
) -> ApiResult<StatusCode> {
    let grant = payload.to_grant()?;

    state
        .route_access_service
        .save_override(route_key.as_str(), grant)
        .await?;

    tracing::info!(actor = %user.user_id(), route = %route_key, "route permission overridden through api");
    Ok(StatusCode::NO_CONTENT)
}
