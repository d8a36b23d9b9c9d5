//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod disabled_permission_cache;
mod in_memory_permission_cache;
mod in_memory_rbac_store;
mod postgres_authorization_repository;
mod postgres_route_permission_repository;
mod postgres_security_admin_repository;
mod redis_permission_cache;

pub use disabled_permission_cache::DisabledPermissionCache;
pub use in_memory_permission_cache::InMemoryPermissionCache;
pub use in_memory_rbac_store::InMemoryRbacStore;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_route_permission_repository::PostgresRoutePermissionRepository;
pub use postgres_security_admin_repository::PostgresSecurityAdminRepository;
pub use redis_permission_cache::RedisPermissionCache;
