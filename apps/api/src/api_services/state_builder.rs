use std::sync::Arc;

use rentops_application::{
    AuthorizationService, PermissionCache, RouteAccessService, SecurityAdminService,
};
use rentops_core::AppError;
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

use super::redis::build_redis_client;

mod caches;
mod repositories;

pub(crate) use repositories::RepositorySet;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let redis_client = config
        .redis_url
        .as_deref()
        .map(build_redis_client)
        .transpose()?;

    let repositories = repositories::build_repository_set(&pool);
    let permission_cache = caches::build_permission_cache(config, redis_client)?;

    Ok(assemble_app_state(
        repositories,
        permission_cache,
        config.permission_cache_ttl_seconds,
        config.bootstrap_token.clone(),
    ))
}

pub(crate) fn assemble_app_state(
    repositories: RepositorySet,
    permission_cache: Arc<dyn PermissionCache>,
    permission_cache_ttl_seconds: u32,
    bootstrap_token: String,
) -> AppState {
    let authorization_service = AuthorizationService::new(
        repositories.authorization_repository.clone(),
        permission_cache,
    )
    .with_cache_ttl(permission_cache_ttl_seconds);

    let security_admin_service = SecurityAdminService::new(
        authorization_service.clone(),
        repositories.security_admin_repository,
    );

    let route_access_service = RouteAccessService::new(
        authorization_service.clone(),
        repositories.route_permission_repository,
    );

    AppState {
        authorization_service,
        security_admin_service,
        route_access_service,
        account_repository: repositories.authorization_repository,
        bootstrap_token,
    }
}
