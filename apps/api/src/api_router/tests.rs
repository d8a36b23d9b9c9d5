use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use rentops_application::{RoutePermissionOverride, RoutePermissionRepository};
use rentops_core::{AppError, AppResult, UserId};
use rentops_domain::PermissionGrant;
use rentops_infrastructure::{InMemoryPermissionCache, InMemoryRbacStore};
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use crate::api_services::{RepositorySet, assemble_app_state, configure_session_layer};
use crate::state::AppState;

use super::build_router;

const BOOTSTRAP_TOKEN: &str = "test-bootstrap-token";

struct UnreachableRouteRepository;

#[async_trait]
impl RoutePermissionRepository for UnreachableRouteRepository {
    async fn find_route_permission(&self, _route_key: &str) -> AppResult<Option<PermissionGrant>> {
        Err(AppError::StoreUnavailable("connection refused".to_owned()))
    }

    async fn list_route_permissions(&self) -> AppResult<Vec<RoutePermissionOverride>> {
        Err(AppError::StoreUnavailable("connection refused".to_owned()))
    }

    async fn save_route_permission(
        &self,
        _route_key: &str,
        _grant: &PermissionGrant,
    ) -> AppResult<()> {
        Err(AppError::StoreUnavailable("connection refused".to_owned()))
    }
}

struct TestApp {
    router: Router,
    state: AppState,
    store: Arc<InMemoryRbacStore>,
}

impl TestApp {
    async fn new() -> Self {
        let store = Arc::new(InMemoryRbacStore::new());
        Self::with_route_repository(store.clone(), store).await
    }

    async fn with_unreachable_routes() -> Self {
        let store = Arc::new(InMemoryRbacStore::new());
        Self::with_route_repository(store, Arc::new(UnreachableRouteRepository)).await
    }

    async fn with_route_repository(
        store: Arc<InMemoryRbacStore>,
        route_permission_repository: Arc<dyn RoutePermissionRepository>,
    ) -> Self {
        let state = assemble_app_state(
            RepositorySet {
                authorization_repository: store.clone(),
                security_admin_repository: store.clone(),
                route_permission_repository,
            },
            Arc::new(InMemoryPermissionCache::new()),
            600,
            BOOTSTRAP_TOKEN.to_owned(),
        );

        let seeded = state.security_admin_service.seed_system_roles().await;
        assert!(seeded.is_ok());

        let session_layer = configure_session_layer(MemoryStore::default(), false);
        let Ok(router) = build_router(state.clone(), "http://localhost:3000", session_layer)
        else {
            panic!("router should build");
        };

        Self {
            router,
            state,
            store,
        }
    }

    async fn user_with_role(&self, email: &str, role_name: &str) -> UserId {
        let user_id = self.store.insert_user(email, email, true).await;
        let assigned = self
            .state
            .security_admin_service
            .assign_role(user_id, role_name)
            .await;
        assert!(assigned.is_ok());
        user_id
    }

    async fn sign_in(&self, user_id: UserId) -> String {
        let response = self
            .send(
                "POST",
                "/auth/bootstrap",
                None,
                Some(json!({ "user_id": user_id.as_i64(), "token": BOOTSTRAP_TOKEN })),
            )
            .await;
        assert_eq!(response.0, StatusCode::NO_CONTENT);

        let Some(cookie) = response.2 else {
            panic!("bootstrap should set a session cookie");
        };
        cookie
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value, Option<String>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }

        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        };
        let Ok(request) = request else {
            panic!("request should build");
        };

        let Ok(response) = self.router.clone().oneshot(request).await;

        let status = response.status();
        let session_cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(ToOwned::to_owned);

        let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body should be readable");
        };
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, body, session_cookie)
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;

    let (status, body, _) = app.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn guarded_routes_reject_missing_sessions() {
    let app = TestApp::new().await;

    let (status, body, _) = app.send("GET", "/api/security/roles", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn bootstrap_rejects_wrong_token_and_inactive_users() {
    let app = TestApp::new().await;
    let inactive = app.store.insert_user("gone@example.com", "Gone", false).await;

    let (wrong_token, _, _) = app
        .send(
            "POST",
            "/auth/bootstrap",
            None,
            Some(json!({ "user_id": inactive.as_i64(), "token": "nope" })),
        )
        .await;
    let (inactive_user, _, _) = app
        .send(
            "POST",
            "/auth/bootstrap",
            None,
            Some(json!({ "user_id": inactive.as_i64(), "token": BOOTSTRAP_TOKEN })),
        )
        .await;

    assert_eq!(wrong_token, StatusCode::UNAUTHORIZED);
    assert_eq!(inactive_user, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authenticated_users_without_permission_are_denied() {
    let app = TestApp::new().await;
    let employee = app.user_with_role("emp@example.com", "employee").await;
    let cookie = app.sign_in(employee).await;

    let (status, body, _) = app
        .send("GET", "/api/security/roles", Some(&cookie), None)
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "Access denied" }));
}

#[tokio::test]
async fn super_admin_lists_seeded_roles() {
    let app = TestApp::new().await;
    let root = app.user_with_role("root@example.com", "super_admin").await;
    let cookie = app.sign_in(root).await;

    let (status, body, _) = app
        .send("GET", "/api/security/roles", Some(&cookie), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let names = body
        .as_array()
        .map(|roles| {
            roles
                .iter()
                .filter_map(|role| role["name"].as_str())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    assert!(names.contains(&"super_admin"));
    assert!(names.contains(&"employee"));
}

#[tokio::test]
async fn grants_through_the_api_change_check_results_immediately() {
    let app = TestApp::new().await;
    let admin = app.user_with_role("root@example.com", "super_admin").await;
    let operator = app.user_with_role("op@example.com", "operator").await;
    let cookie = app.sign_in(admin).await;

    let check = json!({
        "user_id": operator.as_i64(),
        "mode": "single",
        "grants": [{ "action": "delete", "resource": "Rental" }],
    });

    let (_, before, _) = app
        .send("POST", "/api/permissions/check", Some(&cookie), Some(check.clone()))
        .await;
    let (granted, _, _) = app
        .send(
            "POST",
            "/api/security/grants",
            Some(&cookie),
            Some(json!({ "role_name": "operator", "action": "delete", "resource": "Rental" })),
        )
        .await;
    let (_, after, _) = app
        .send("POST", "/api/permissions/check", Some(&cookie), Some(check.clone()))
        .await;
    let (revoked, _, _) = app
        .send(
            "POST",
            "/api/security/revocations",
            Some(&cookie),
            Some(json!({ "role_name": "operator", "action": "delete", "resource": "Rental" })),
        )
        .await;
    let (_, restored, _) = app
        .send("POST", "/api/permissions/check", Some(&cookie), Some(check))
        .await;

    assert_eq!(before["allowed"], json!(false));
    assert_eq!(granted, StatusCode::NO_CONTENT);
    assert_eq!(after["allowed"], json!(true));
    assert_eq!(revoked, StatusCode::NO_CONTENT);
    assert_eq!(restored["allowed"], json!(false));
}

#[tokio::test]
async fn hyphenated_and_stage_qualified_grants_are_accepted() {
    let app = TestApp::new().await;
    let admin = app.user_with_role("root@example.com", "super_admin").await;
    let foreman = app.user_with_role("foreman@example.com", "supervisor").await;
    let cookie = app.sign_in(admin).await;

    for (action, resource) in [("create", "advance-payment"), ("approve", "Timesheet.Foreman")] {
        let (granted, _, _) = app
            .send(
                "POST",
                "/api/security/grants",
                Some(&cookie),
                Some(json!({ "role_name": "supervisor", "action": action, "resource": resource })),
            )
            .await;
        assert_eq!(granted, StatusCode::NO_CONTENT, "{action}.{resource}");
    }

    let (status, body, _) = app
        .send(
            "POST",
            "/api/permissions/check",
            Some(&cookie),
            Some(json!({
                "user_id": foreman.as_i64(),
                "mode": "all",
                "grants": [
                    { "action": "create", "resource": "advance-payment" },
                    { "action": "approve", "resource": "Timesheet.Foreman" },
                ],
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], json!(true));
}

#[tokio::test]
async fn grants_to_unknown_roles_are_not_found() {
    let app = TestApp::new().await;
    let admin = app.user_with_role("root@example.com", "super_admin").await;
    let cookie = app.sign_in(admin).await;

    let (status, _, _) = app
        .send(
            "POST",
            "/api/security/grants",
            Some(&cookie),
            Some(json!({ "role_name": "Ghost", "action": "read", "resource": "Equipment" })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn single_mode_requires_exactly_one_grant() {
    let app = TestApp::new().await;
    let admin = app.user_with_role("root@example.com", "super_admin").await;
    let cookie = app.sign_in(admin).await;

    let (status, _, _) = app
        .send(
            "POST",
            "/api/permissions/check",
            Some(&cookie),
            Some(json!({
                "user_id": admin.as_i64(),
                "mode": "single",
                "grants": [
                    { "action": "read", "resource": "Rental" },
                    { "action": "read", "resource": "Employee" },
                ],
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_reports_permissions_and_accessible_routes() {
    let app = TestApp::new().await;
    let supervisor = app.user_with_role("sup@example.com", "supervisor").await;
    let cookie = app.sign_in(supervisor).await;

    let (status, body, _) = app.send("GET", "/auth/me", Some(&cookie), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["declared_role"], json!("supervisor"));
    assert_eq!(body["roles"], json!(["supervisor"]));
    let routes = body["accessible_routes"].as_array().cloned().unwrap_or_default();
    assert!(routes.contains(&json!("rentals.read")));
    assert!(!routes.contains(&json!("roles.read")));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = TestApp::new().await;
    let admin = app.user_with_role("root@example.com", "super_admin").await;
    let cookie = app.sign_in(admin).await;

    let (logout, _, _) = app.send("POST", "/auth/logout", Some(&cookie), None).await;
    let (me, _, _) = app.send("GET", "/auth/me", Some(&cookie), None).await;

    assert_eq!(logout, StatusCode::NO_CONTENT);
    assert_eq!(me, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn route_overrides_change_the_required_grant() {
    let app = TestApp::new().await;
    let admin = app.user_with_role("root@example.com", "super_admin").await;
    let supervisor = app.user_with_role("sup@example.com", "supervisor").await;
    let admin_cookie = app.sign_in(admin).await;
    let supervisor_cookie = app.sign_in(supervisor).await;

    let (before, _, _) = app
        .send("GET", "/api/security/roles", Some(&supervisor_cookie), None)
        .await;
    let (saved, _, _) = app
        .send(
            "PUT",
            "/api/security/route-permissions/roles.read",
            Some(&admin_cookie),
            Some(json!({ "action": "read", "resource": "Rental" })),
        )
        .await;
    let (after, _, _) = app
        .send("GET", "/api/security/roles", Some(&supervisor_cookie), None)
        .await;
    let (unknown, _, _) = app
        .send(
            "PUT",
            "/api/security/route-permissions/unknown.route",
            Some(&admin_cookie),
            Some(json!({ "action": "read", "resource": "Rental" })),
        )
        .await;
    let (_, listed, _) = app
        .send(
            "GET",
            "/api/security/route-permissions",
            Some(&admin_cookie),
            None,
        )
        .await;

    assert_eq!(before, StatusCode::FORBIDDEN);
    assert_eq!(saved, StatusCode::NO_CONTENT);
    assert_eq!(after, StatusCode::OK);
    assert_eq!(unknown, StatusCode::NOT_FOUND);
    let roles_read = listed
        .as_array()
        .and_then(|routes| routes.iter().find(|route| route["route_key"] == "roles.read"))
        .cloned();
    assert_eq!(
        roles_read,
        Some(json!({
            "route_key": "roles.read",
            "action": "read",
            "resource": "Rental",
            "overridden": true,
        }))
    );
}

#[tokio::test]
async fn deactivated_users_lose_access_on_the_next_request() {
    let app = TestApp::new().await;
    let admin = app.user_with_role("root@example.com", "super_admin").await;
    let manager = app.user_with_role("mgr@example.com", "admin").await;
    let admin_cookie = app.sign_in(admin).await;
    let manager_cookie = app.sign_in(manager).await;

    let (before, _, _) = app
        .send("GET", "/api/security/roles", Some(&manager_cookie), None)
        .await;
    let (deactivated, _, _) = app
        .send(
            "PUT",
            &format!("/api/security/users/{}/status", manager.as_i64()),
            Some(&admin_cookie),
            Some(json!({ "is_active": false })),
        )
        .await;
    let (after, _, _) = app
        .send("GET", "/api/security/roles", Some(&manager_cookie), None)
        .await;

    assert_eq!(before, StatusCode::OK);
    assert_eq!(deactivated, StatusCode::NO_CONTENT);
    assert_eq!(after, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unreachable_route_mappings_fall_back_to_declared_roles() {
    let app = TestApp::with_unreachable_routes().await;
    let admin = app.user_with_role("root@example.com", "admin").await;
    let employee = app.user_with_role("emp@example.com", "employee").await;
    let admin_cookie = app.sign_in(admin).await;
    let employee_cookie = app.sign_in(employee).await;

    let (admin_status, _, _) = app
        .send("GET", "/api/security/roles", Some(&admin_cookie), None)
        .await;
    let (employee_status, _, _) = app
        .send("GET", "/api/security/roles", Some(&employee_cookie), None)
        .await;
    let (super_admin_only, _, _) = app
        .send(
            "POST",
            "/api/security/grants",
            Some(&admin_cookie),
            Some(json!({ "role_name": "employee", "action": "read", "resource": "Role" })),
        )
        .await;

    assert_eq!(admin_status, StatusCode::OK);
    assert_eq!(employee_status, StatusCode::FORBIDDEN);
    assert_eq!(super_admin_only, StatusCode::FORBIDDEN);
}
