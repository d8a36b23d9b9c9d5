use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use rentops_core::UserIdentity;

use crate::dto::{
    CreateRoleRequest, GrantPayload, RoleAssignmentRequest, RoleGrantRequest, RoleResponse,
    RoutePermissionResponse, UpdateUserStatusRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod grants;
mod roles;
mod routes;
mod users;

pub use grants::{grant_permission_handler, invalidate_cache_handler, revoke_permission_handler};
pub use roles::{create_role_handler, list_roles_handler};
pub use routes::{list_route_permissions_handler, save_route_permission_handler};
pub use users::{assign_role_handler, unassign_role_handler, update_user_status_handler};
