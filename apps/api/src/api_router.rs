use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use rentops_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::RouteKey;
use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

#[cfg(test)]
mod tests;

use cors::build_cors_layer;

pub fn build_router<Store>(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<Store>,
) -> Result<Router, AppError>
where
    Store: SessionStore + Clone,
{
    let cors_layer = build_cors_layer(frontend_url)?;

    let session_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route_layer(from_fn(middleware::require_auth));

    let permission_check_routes = guarded(
        &app_state,
        "permissions.check",
        Router::new().route(
            "/api/permissions/check",
            post(handlers::permissions::check_permissions_handler),
        ),
    );

    let role_read_routes = guarded(
        &app_state,
        "roles.read",
        Router::new().route(
            "/api/security/roles",
            get(handlers::security::list_roles_handler),
        ),
    );

    let role_create_routes = guarded(
        &app_state,
        "roles.create",
        Router::new().route(
            "/api/security/roles",
            post(handlers::security::create_role_handler),
        ),
    );

    let grant_routes = guarded(
        &app_state,
        "grants.create",
        Router::new().route(
            "/api/security/grants",
            post(handlers::security::grant_permission_handler),
        ),
    );

    let revocation_routes = guarded(
        &app_state,
        "grants.delete",
        Router::new().route(
            "/api/security/revocations",
            post(handlers::security::revoke_permission_handler),
        ),
    );

    let role_assignment_routes = guarded(
        &app_state,
        "users.assign_role",
        Router::new()
            .route(
                "/api/security/role-assignments",
                post(handlers::security::assign_role_handler),
            )
            .route(
                "/api/security/role-unassignments",
                post(handlers::security::unassign_role_handler),
            ),
    );

    let user_status_routes = guarded(
        &app_state,
        "users.update_status",
        Router::new().route(
            "/api/security/users/{user_id}/status",
            put(handlers::security::update_user_status_handler),
        ),
    );

    let cache_routes = guarded(
        &app_state,
        "cache.invalidate",
        Router::new().route(
            "/api/security/cache/invalidate",
            post(handlers::security::invalidate_cache_handler),
        ),
    );

    let route_permission_read_routes = guarded(
        &app_state,
        "routes.read",
        Router::new().route(
            "/api/security/route-permissions",
            get(handlers::security::list_route_permissions_handler),
        ),
    );

    let route_permission_update_routes = guarded(
        &app_state,
        "routes.update",
        Router::new().route(
            "/api/security/route-permissions/{route_key}",
            put(handlers::security::save_route_permission_handler),
        ),
    );

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(session_routes)
        .merge(permission_check_routes)
        .merge(role_read_routes)
        .merge(role_create_routes)
        .merge(grant_routes)
        .merge(revocation_routes)
        .merge(role_assignment_routes)
        .merge(user_status_routes)
        .merge(cache_routes)
        .merge(route_permission_read_routes)
        .merge(route_permission_update_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}

fn guarded(
    app_state: &AppState,
    route_key: &'static str,
    routes: Router<AppState>,
) -> Router<AppState> {
    routes
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_route_permission,
        ))
        .layer(axum::Extension(RouteKey(route_key)))
}
