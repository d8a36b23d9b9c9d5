use rentops_application::RoleDefinition;
use rentops_core::UserId;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::GrantPayload;

/// How multiple grants in a check request are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/check-mode.ts"
)]
pub enum CheckMode {
    Single,
    Any,
    All,
}

/// Incoming payload for permission checks on behalf of a user.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/check-permissions-request.ts"
)]
pub struct CheckPermissionsRequest {
    pub user_id: i64,
    pub mode: CheckMode,
    pub grants: Vec<GrantPayload>,
}

/// Result of a permission check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/check-permissions-response.ts"
)]
pub struct CheckPermissionsResponse {
    pub user_id: i64,
    pub allowed: bool,
}

/// Incoming payload for custom role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    pub permissions: Vec<String>,
}

/// API representation of an RBAC role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: i64,
    pub name: String,
    pub permissions: Vec<String>,
}

impl From<RoleDefinition> for RoleResponse {
    fn from(value: RoleDefinition) -> Self {
        Self {
            role_id: value.role_id.as_i64(),
            name: value.name,
            permissions: value.permissions,
        }
    }
}

/// Incoming payload for granting or revoking a permission on a role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-grant-request.ts"
)]
pub struct RoleGrantRequest {
    pub role_name: String,
    pub action: String,
    pub resource: String,
}

impl RoleGrantRequest {
    pub fn grant_payload(&self) -> GrantPayload {
        GrantPayload {
            action: self.action.clone(),
            resource: self.resource.clone(),
        }
    }
}

/// Incoming payload for role assignment and unassignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-assignment-request.ts"
)]
pub struct RoleAssignmentRequest {
    pub user_id: i64,
    pub role_name: String,
}

impl RoleAssignmentRequest {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.user_id)
    }
}

/// Incoming payload for user activation changes.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-user-status-request.ts"
)]
pub struct UpdateUserStatusRequest {
    pub is_active: bool,
}

/// Effective permission requirement of a declared route.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/route-permission-response.ts"
)]
pub struct RoutePermissionResponse {
    pub route_key: String,
    pub action: String,
    pub resource: String,
    pub overridden: bool,
}
