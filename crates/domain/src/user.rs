//! User account projection used by permission resolution.

use rentops_core::UserId;

use crate::role::RoleId;

/// User row as seen by the permission store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// User identifier.
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Soft deactivation flag; inactive users resolve to no permissions.
    pub is_active: bool,
    /// Transitional single-role reference kept on the `users` row.
    pub legacy_role_id: Option<RoleId>,
}
