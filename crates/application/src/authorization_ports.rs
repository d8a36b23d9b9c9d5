use async_trait::async_trait;
use rentops_core::{AppResult, UserId};
use rentops_domain::{RoleId, RoleRecord, UserAccount};

/// Repository port for permission resolution reads.
///
/// Permission names are returned as stored so that one malformed row does
/// not hide the rest of a user's grants.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Finds a user account by id.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>>;

    /// Lists roles held through the legacy `role_id` column and role assignments.
    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleRecord>>;

    /// Lists permission names linked to any of the roles.
    async fn list_permission_names_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<String>>;

    /// Lists permission names granted directly to the user.
    async fn list_direct_permission_names(&self, user_id: UserId) -> AppResult<Vec<String>>;
}
