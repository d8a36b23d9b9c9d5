//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_ports;
mod authorization_service;
mod permission_cache;
mod route_access_service;
mod security_admin_ports;
mod security_admin_service;

#[cfg(test)]
mod test_fakes;

pub use authorization_ports::AuthorizationRepository;
pub use authorization_service::AuthorizationService;
pub use permission_cache::{
    CacheLookup, CacheTag, CachedPermissionSet, DEFAULT_PERMISSION_CACHE_TTL_SECONDS,
    PermissionCache,
};
pub use route_access_service::{
    AccessDecision, RouteAccessService, RouteRequirement, RoutePermissionOverride,
    RoutePermissionRepository,
};
pub use security_admin_ports::{
    CreateRoleInput, RoleDefinition, SecurityAdminRepository, SeedSummary,
};
pub use security_admin_service::SecurityAdminService;
