use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use rentops_core::{AppResult, UserId};
use rentops_domain::{Action, PermissionName, Resource};
use serde::{Deserialize, Serialize};

/// Default lifetime of a cached permission set.
pub const DEFAULT_PERMISSION_CACHE_TTL_SECONDS: u32 = 600;

/// Resolved roles and permissions of one active user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPermissionSet {
    /// Owner of the set.
    pub user_id: UserId,
    /// Role names held through the legacy column or role assignments.
    pub roles: Vec<String>,
    /// Union of role permissions and direct user permissions.
    pub permissions: Vec<PermissionName>,
}

impl CachedPermissionSet {
    /// Returns whether the set grants the action on the resource.
    ///
    /// Global wildcards are checked before scoped permissions.
    #[must_use]
    pub fn allows(&self, action: Action, resource: &Resource) -> bool {
        self.permissions
            .iter()
            .any(PermissionName::is_global_wildcard)
            || self
                .permissions
                .iter()
                .any(|permission| permission.covers(action, resource))
    }

    /// Returns whether the set contains the role name, compared exactly.
    #[must_use]
    pub fn has_role(&self, role_name: &str) -> bool {
        self.roles.iter().any(|role| role == role_name)
    }
}

/// Invalidation tag attached to cache entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTag {
    /// Every entry derived from permission rows.
    Permissions,
    /// Every entry derived from role rows.
    Roles,
    /// Entries for one user.
    User(UserId),
}

impl CacheTag {
    /// Returns the tags attached to a user's permission set.
    #[must_use]
    pub fn for_user(user_id: UserId) -> [Self; 3] {
        [Self::Permissions, Self::Roles, Self::User(user_id)]
    }
}

impl Display for CacheTag {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permissions => formatter.write_str("permissions"),
            Self::Roles => formatter.write_str("roles"),
            Self::User(user_id) => write!(formatter, "user:{user_id}"),
        }
    }
}

/// Outcome of a cache read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// A set for the requested user was found.
    Hit(CachedPermissionSet),
    /// The cache answered without an entry.
    Miss,
    /// The cache could not be reached.
    Unavailable,
}

/// Cache port for resolved permission sets.
#[async_trait]
pub trait PermissionCache: Send + Sync {
    /// Returns the cached set for a user.
    async fn get(&self, user_id: UserId) -> AppResult<Option<CachedPermissionSet>>;

    /// Stores a user's set with ttl and invalidation tags.
    async fn put(
        &self,
        user_id: UserId,
        set: CachedPermissionSet,
        ttl_seconds: u32,
        tags: &[CacheTag],
    ) -> AppResult<()>;

    /// Drops every entry carrying the tag.
    async fn invalidate_tag(&self, tag: CacheTag) -> AppResult<()>;

    /// Drops every entry.
    async fn invalidate_all(&self) -> AppResult<()>;
}
