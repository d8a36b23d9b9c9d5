use rentops_core::{AppError, UserId};
use rentops_domain::RoutePolicy;

use crate::test_fakes::{Harness, grant, harness, identity};
use crate::{AccessDecision, RouteAccessService, RouteRequirement};

fn service(harness: &Harness) -> RouteAccessService {
    RouteAccessService::new(harness.authorization.clone(), harness.store.clone())
}

fn policy(key: &str) -> &'static RoutePolicy {
    RoutePolicy::find(key).unwrap_or_else(|| panic!("route '{key}' must be declared"))
}

#[tokio::test]
async fn missing_identity_is_unauthenticated() {
    let harness = harness();

    let decision = service(&harness)
        .authorize(None, policy("roles.read"))
        .await;

    assert_eq!(decision, AccessDecision::Unauthenticated);
    assert_eq!(harness.store.user_lookups(), 0);
}

#[tokio::test]
async fn static_grant_applies_without_override() {
    let harness = harness();
    let service = service(&harness);
    let user_id = harness.store.add_user(1, true).await;
    let role = harness.store.add_role("auditor").await;
    harness.store.assign(user_id, role).await;
    harness.store.link_raw_permission(role, "read.Role").await;

    let allowed = service
        .authorize(Some(identity(user_id, None)), policy("roles.read"))
        .await;
    let denied = service
        .authorize(Some(identity(user_id, None)), policy("roles.create"))
        .await;

    assert!(matches!(allowed, AccessDecision::Allowed(found) if found.user_id() == user_id));
    assert_eq!(denied, AccessDecision::Denied);
}

#[tokio::test]
async fn dynamic_override_replaces_static_grant() {
    let harness = harness();
    let service = service(&harness);
    let user_id = harness.store.add_user(1, true).await;
    let role = harness.store.add_role("dispatcher").await;
    harness.store.assign(user_id, role).await;
    harness.store.link_raw_permission(role, "read.Rental").await;

    assert!(
        service
            .save_override("roles.read", grant("read.Rental"))
            .await
            .is_ok()
    );

    assert_eq!(
        service.route_requirement(policy("roles.read")).await,
        RouteRequirement::Grant(grant("read.Rental"))
    );
    assert!(matches!(
        service
            .authorize(Some(identity(user_id, None)), policy("roles.read"))
            .await,
        AccessDecision::Allowed(_)
    ));
}

#[tokio::test]
async fn degraded_mode_only_admits_fallback_roles() {
    let harness = harness();
    let service = service(&harness);
    harness.store.fail_routes(true);
    let user_id = UserId::new(1);

    let admin = service
        .authorize(Some(identity(user_id, Some("admin"))), policy("roles.read"))
        .await;
    let employee = service
        .authorize(
            Some(identity(user_id, Some("employee"))),
            policy("roles.read"),
        )
        .await;
    let unknown_case = service
        .authorize(Some(identity(user_id, Some("Admin"))), policy("roles.read"))
        .await;
    let undeclared = service
        .authorize(Some(identity(user_id, None)), policy("roles.read"))
        .await;

    assert!(matches!(admin, AccessDecision::Allowed(_)));
    assert_eq!(employee, AccessDecision::Denied);
    assert_eq!(unknown_case, AccessDecision::Denied);
    assert_eq!(undeclared, AccessDecision::Denied);
    assert_eq!(harness.store.user_lookups(), 0);
}

#[tokio::test]
async fn accessible_routes_follow_effective_permissions() {
    let harness = harness();
    let service = service(&harness);
    let user_id = harness.store.add_user(1, true).await;
    let role = harness.store.add_role("supervisor").await;
    harness.store.assign(user_id, role).await;
    harness.store.link_raw_permission(role, "read.Rental").await;
    harness.store.link_raw_permission(role, "read.Equipment").await;

    let routes = service.accessible_routes(&identity(user_id, None)).await;

    assert_eq!(routes, vec!["equipment.read", "rentals.read"]);
}

#[tokio::test]
async fn accessible_routes_use_fallback_roles_when_mapping_fails() {
    let harness = harness();
    let service = service(&harness);
    harness.store.fail_routes(true);

    let routes = service
        .accessible_routes(&identity(UserId::new(1), Some("super_admin")))
        .await;

    assert_eq!(routes.len(), RoutePolicy::all().len());
}

#[tokio::test]
async fn overrides_are_limited_to_declared_routes() {
    let harness = harness();
    let service = service(&harness);

    let result = service
        .save_override("unknown.route", grant("read.Rental"))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(matches!(service.list_overrides().await, Ok(overrides) if overrides.is_empty()));
}
