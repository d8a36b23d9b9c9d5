use axum::extract::{Extension, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use rentops_application::AccessDecision;
use rentops_core::{AppError, UserIdentity};
use rentops_domain::RoutePolicy;
use tower_sessions::Session;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

/// Route key attached to a guarded router so the guard can find its policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteKey(pub &'static str);

pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = read_session_identity(&session)
        .await?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub async fn require_route_permission(
    State(state): State<AppState>,
    Extension(route_key): Extension<RouteKey>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let policy = RoutePolicy::find(route_key.0).ok_or_else(|| {
        AppError::Internal(format!("route '{}' has no declared policy", route_key.0))
    })?;

    let identity = read_session_identity(&session).await?;
    match state.route_access_service.authorize(identity, policy).await {
        AccessDecision::Unauthenticated => {
            Err(AppError::Unauthorized("authentication required".to_owned()).into())
        }
        AccessDecision::Denied => Err(AppError::Forbidden(format!(
            "missing permission for route '{}'",
            policy.key()
        ))
        .into()),
        AccessDecision::Allowed(identity) => {
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
    }
}

async fn read_session_identity(session: &Session) -> ApiResult<Option<UserIdentity>> {
    session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")).into())
}
