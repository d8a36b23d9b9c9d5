//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod role;
mod route_policy;
mod security;
mod user;

pub use role::{PermissionId, PermissionRecord, RoleId, RoleRecord, SystemRole};
pub use route_policy::RoutePolicy;
pub use security::{
    Action, PERMISSION_DELIMITER, PermissionGrant, PermissionName, Resource, WILDCARD_PERMISSION,
};
pub use user::UserAccount;
