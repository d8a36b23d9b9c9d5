use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use rentops_core::{AppError, AppResult, UserId, UserIdentity};
use rentops_domain::{Action, PermissionGrant, PermissionName, Resource, RoleId};
use tracing::{debug, warn};

use crate::authorization_ports::AuthorizationRepository;
use crate::permission_cache::{
    CacheLookup, CacheTag, CachedPermissionSet, DEFAULT_PERMISSION_CACHE_TTL_SECONDS,
    PermissionCache,
};

mod cache;
mod permissions;
mod roles;


/// Application service answering permission and role checks for users.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
    cache: Arc<dyn PermissionCache>,
    cache_ttl_seconds: u32,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AuthorizationRepository>,
        cache: Arc<dyn PermissionCache>,
    ) -> Self {
        Self {
            repository,
            cache,
            cache_ttl_seconds: DEFAULT_PERMISSION_CACHE_TTL_SECONDS,
        }
    }

    /// Overrides the cache ttl. Zero disables cache population.
    #[must_use]
    pub fn with_cache_ttl(mut self, cache_ttl_seconds: u32) -> Self {
        self.cache_ttl_seconds = cache_ttl_seconds;
        self
    }

    /// Resolves the permission set of an active user.
    ///
    /// Returns `None` for unknown or inactive users.
    async fn resolve_permission_set(
        &self,
        user_id: UserId,
    ) -> AppResult<Option<CachedPermissionSet>> {
        let lookup = self.lookup_cached(user_id).await;
        if let CacheLookup::Hit(set) = lookup {
            return Ok(Some(set));
        }

        let Some(set) = self.load_permission_set(user_id).await? else {
            return Ok(None);
        };

        if lookup == CacheLookup::Miss {
            self.populate_cache(&set).await;
        }

        Ok(Some(set))
    }

    /// Resolves the permission set for a boolean check, denying on store errors.
    async fn resolve_or_deny(&self, user_id: UserId) -> Option<CachedPermissionSet> {
        match self.resolve_permission_set(user_id).await {
            Ok(set) => set,
            Err(error) => {
                warn!(user_id = %user_id, error = %error, "authorization check failed, denying");
                None
            }
        }
    }

    async fn load_permission_set(&self, user_id: UserId) -> AppResult<Option<CachedPermissionSet>> {
        let Some(user) = self.repository.find_user(user_id).await? else {
            debug!(user_id = %user_id, "permission check for unknown user");
            return Ok(None);
        };

        if !user.is_active {
            debug!(user_id = %user_id, "permission check for inactive user");
            return Ok(None);
        }

        let roles = self.repository.list_roles_for_user(user_id).await?;
        let role_ids: Vec<RoleId> = roles.iter().map(|role| role.id).collect();

        let mut stored_names = if role_ids.is_empty() {
            Vec::new()
        } else {
            self.repository
                .list_permission_names_for_roles(&role_ids)
                .await?
        };
        stored_names.extend(self.repository.list_direct_permission_names(user_id).await?);

        let mut permissions = BTreeSet::new();
        for stored_name in stored_names {
            match PermissionName::from_str(&stored_name) {
                Ok(permission) => {
                    permissions.insert(permission);
                }
                Err(error) => {
                    warn!(
                        user_id = %user_id,
                        permission = %stored_name,
                        error = %error,
                        "skipping malformed permission row"
                    );
                }
            }
        }

        let role_names: BTreeSet<String> = roles.into_iter().map(|role| role.name).collect();

        Ok(Some(CachedPermissionSet {
            user_id,
            roles: role_names.into_iter().collect(),
            permissions: permissions.into_iter().collect(),
        }))
    }
}
