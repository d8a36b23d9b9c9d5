use std::sync::Arc;

use rentops_application::{
    AuthorizationRepository, RoutePermissionRepository, SecurityAdminRepository,
};
use rentops_infrastructure::{
    PostgresAuthorizationRepository, PostgresRoutePermissionRepository,
    PostgresSecurityAdminRepository,
};
use sqlx::PgPool;

pub(crate) struct RepositorySet {
    pub(crate) authorization_repository: Arc<dyn AuthorizationRepository>,
    pub(crate) security_admin_repository: Arc<dyn SecurityAdminRepository>,
    pub(crate) route_permission_repository: Arc<dyn RoutePermissionRepository>,
}

pub(super) fn build_repository_set(pool: &PgPool) -> RepositorySet {
    RepositorySet {
        authorization_repository: Arc::new(PostgresAuthorizationRepository::new(pool.clone())),
        security_admin_repository: Arc::new(PostgresSecurityAdminRepository::new(pool.clone())),
        route_permission_repository: Arc::new(PostgresRoutePermissionRepository::new(
            pool.clone(),
        )),
    }
}
