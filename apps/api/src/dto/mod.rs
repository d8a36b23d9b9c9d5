mod auth;
mod common;
mod security;

pub use auth::{BootstrapRequest, CurrentUserResponse};
pub use common::{GrantPayload, HealthResponse};
pub use security::{
    CheckMode, CheckPermissionsRequest, CheckPermissionsResponse, CreateRoleRequest,
    RoleAssignmentRequest, RoleGrantRequest, RoleResponse, RoutePermissionResponse,
    UpdateUserStatusRequest,
};
