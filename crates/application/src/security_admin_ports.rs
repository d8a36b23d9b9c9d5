use async_trait::async_trait;

use rentops_core::{AppResult, UserId};
use rentops_domain::{PermissionId, PermissionName, PermissionRecord, RoleId, RoleRecord};

/// Role definition returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Role identifier.
    pub role_id: RoleId,
    /// Unique role name.
    pub name: String,
    /// Permission names linked to the role, as stored.
    pub permissions: Vec<String>,
}

/// Input payload for creating custom roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: String,
    /// Permissions to link to the role.
    pub permissions: Vec<PermissionName>,
}

/// Counts reported after seeding the shipped roles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Roles present after seeding.
    pub roles: usize,
    /// Role permission links newly inserted.
    pub grants_inserted: usize,
}

/// Repository port for role, grant and user administration.
#[async_trait]
pub trait SecurityAdminRepository: Send + Sync {
    /// Returns the permission row for a name, inserting it when missing.
    async fn upsert_permission(&self, name: &PermissionName) -> AppResult<PermissionRecord>;

    /// Finds a permission row by name.
    async fn find_permission_by_name(
        &self,
        name: &PermissionName,
    ) -> AppResult<Option<PermissionRecord>>;

    /// Finds a role row by exact name.
    async fn find_role_by_name(&self, role_name: &str) -> AppResult<Option<RoleRecord>>;

    /// Links a permission to a role. Returns `false` when the link already existed.
    async fn insert_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool>;

    /// Unlinks a permission from a role. Returns `false` when no link existed.
    async fn delete_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool>;

    /// Lists all roles with linked permissions.
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>>;

    /// Creates a role and links its permissions in one unit of work.
    ///
    /// Fails with a conflict when the name is taken. On any failure nothing
    /// is persisted.
    async fn create_role_with_permissions(
        &self,
        role_name: &str,
        permissions: &[PermissionName],
    ) -> AppResult<RoleRecord>;

    /// Returns the role row for a name, inserting it when missing.
    async fn ensure_role(&self, role_name: &str) -> AppResult<RoleRecord>;

    /// Assigns a role to a user. Assigning a held role is a no-op.
    async fn assign_role_to_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<()>;

    /// Removes a role assignment. Returns `false` when no assignment existed.
    async fn remove_role_from_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool>;

    /// Sets the active flag on a user. Fails with not found for unknown users.
    async fn set_user_active(&self, user_id: UserId, is_active: bool) -> AppResult<()>;
}
