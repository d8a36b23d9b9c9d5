use std::sync::Arc;

use rentops_application::PermissionCache;
use rentops_core::{AppError, AppResult};
use rentops_infrastructure::{
    DisabledPermissionCache, InMemoryPermissionCache, RedisPermissionCache,
};
use tracing::info;

use crate::api_config::{ApiConfig, PermissionCacheBackend};

pub(super) fn build_permission_cache(
    config: &ApiConfig,
    redis_client: Option<redis::Client>,
) -> AppResult<Arc<dyn PermissionCache>> {
    let cache: Arc<dyn PermissionCache> = match config.permission_cache_backend {
        PermissionCacheBackend::InMemory => Arc::new(InMemoryPermissionCache::new()),
        PermissionCacheBackend::Redis => {
            let redis_client = redis_client.ok_or_else(|| {
                AppError::Validation(
                    "REDIS_URL is required when PERMISSION_CACHE_BACKEND=redis".to_owned(),
                )
            })?;
            Arc::new(RedisPermissionCache::new(redis_client, "rentops:permissions"))
        }
        PermissionCacheBackend::Disabled => Arc::new(DisabledPermissionCache),
    };

    info!(
        backend = ?config.permission_cache_backend,
        ttl_seconds = config.permission_cache_ttl_seconds,
        "permission cache configured"
    );

    Ok(cache)
}
