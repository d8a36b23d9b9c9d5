use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use rentops_core::{AppError, AppResult, UserIdentity};
use rentops_domain::{PermissionGrant, RoutePolicy, SystemRole};
use tracing::{debug, info, warn};

use crate::AuthorizationService;

#[cfg(test)]
mod tests;

/// Administrator override of a route's required permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePermissionOverride {
    /// Route key the override applies to.
    pub route_key: String,
    /// Required grant replacing the static policy grant.
    pub grant: PermissionGrant,
}

/// Repository port for dynamic route permission mappings.
#[async_trait]
pub trait RoutePermissionRepository: Send + Sync {
    /// Finds the override for a route key.
    async fn find_route_permission(&self, route_key: &str) -> AppResult<Option<PermissionGrant>>;

    /// Lists every override.
    async fn list_route_permissions(&self) -> AppResult<Vec<RoutePermissionOverride>>;

    /// Creates or replaces the override for a route key.
    async fn save_route_permission(&self, route_key: &str, grant: &PermissionGrant)
    -> AppResult<()>;
}

/// Outcome of a route guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// No authenticated identity was presented.
    Unauthenticated,
    /// The identity may use the route.
    Allowed(UserIdentity),
    /// The identity is authenticated but lacks access.
    Denied,
}

/// Effective requirement of one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteRequirement {
    /// A grant from the dynamic mapping or the static policy.
    Grant(PermissionGrant),
    /// The mapping could not be loaded; only fallback roles pass.
    Degraded,
}

/// Application service deciding access to protected routes.
#[derive(Clone)]
pub struct RouteAccessService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn RoutePermissionRepository>,
}

impl RouteAccessService {
    /// Creates a new route access service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn RoutePermissionRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
        }
    }

    /// Decides whether the identity may use the route.
    pub async fn authorize(
        &self,
        identity: Option<UserIdentity>,
        policy: &RoutePolicy,
    ) -> AccessDecision {
        let Some(identity) = identity else {
            debug!(route = policy.key(), "route access without session");
            return AccessDecision::Unauthenticated;
        };

        let allowed = match self.route_requirement(policy).await {
            RouteRequirement::Grant(grant) => {
                self.authorization_service
                    .can(identity.user_id(), grant.action, &grant.resource)
                    .await
            }
            RouteRequirement::Degraded => Self::fallback_allows(&identity, policy),
        };

        if allowed {
            AccessDecision::Allowed(identity)
        } else {
            info!(
                route = policy.key(),
                user_id = %identity.user_id(),
                "route access denied"
            );
            AccessDecision::Denied
        }
    }

    /// Returns the effective requirement of a route.
    pub async fn route_requirement(&self, policy: &RoutePolicy) -> RouteRequirement {
        match self.repository.find_route_permission(policy.key()).await {
            Ok(Some(grant)) => RouteRequirement::Grant(grant),
            Ok(None) => RouteRequirement::Grant(policy.grant().clone()),
            Err(error) => {
                warn!(
                    route = policy.key(),
                    error = %error,
                    "route permission mapping unavailable, using fallback roles"
                );
                RouteRequirement::Degraded
            }
        }
    }

    /// Returns the keys of every route the identity may use.
    pub async fn accessible_routes(&self, identity: &UserIdentity) -> Vec<&'static str> {
        let overrides = match self.repository.list_route_permissions().await {
            Ok(overrides) => Some(
                overrides
                    .into_iter()
                    .map(|value| (value.route_key, value.grant))
                    .collect::<HashMap<_, _>>(),
            ),
            Err(error) => {
                warn!(error = %error, "route permission mapping unavailable, using fallback roles");
                None
            }
        };

        let Some(overrides) = overrides else {
            return RoutePolicy::all()
                .iter()
                .filter(|policy| Self::fallback_allows(identity, policy))
                .map(RoutePolicy::key)
                .collect();
        };

        let Ok(Some(set)) = self
            .authorization_service
            .effective_permissions(identity.user_id())
            .await
        else {
            return Vec::new();
        };

        RoutePolicy::all()
            .iter()
            .filter(|policy| {
                let grant = overrides.get(policy.key()).unwrap_or(policy.grant());
                set.allows(grant.action, &grant.resource)
            })
            .map(RoutePolicy::key)
            .collect()
    }

    /// Lists administrator overrides.
    pub async fn list_overrides(&self) -> AppResult<Vec<RoutePermissionOverride>> {
        self.repository.list_route_permissions().await
    }

    /// Overrides the required grant of a declared route.
    pub async fn save_override(&self, route_key: &str, grant: PermissionGrant) -> AppResult<()> {
        if RoutePolicy::find(route_key).is_none() {
            return Err(AppError::NotFound(format!("route '{route_key}' is not declared")));
        }

        self.repository
            .save_route_permission(route_key, &grant)
            .await?;
        info!(route = route_key, grant = %grant, "route permission updated");
        Ok(())
    }

    fn fallback_allows(identity: &UserIdentity, policy: &RoutePolicy) -> bool {
        identity
            .declared_role()
            .and_then(|role| SystemRole::from_str(role).ok())
            .is_some_and(|role| policy.allows_fallback_role(role))
    }
}
