use async_trait::async_trait;
use rentops_application::{CacheTag, CachedPermissionSet, PermissionCache};
use rentops_core::{AppResult, UserId};

/// Cache adapter that never stores anything.
///
/// Every permission check reads the store.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledPermissionCache;

#[async_trait]
impl PermissionCache for DisabledPermissionCache {
    async fn get(&self, _user_id: UserId) -> AppResult<Option<CachedPermissionSet>> {
        Ok(None)
    }

    async fn put(
        &self,
        _user_id: UserId,
        _set: CachedPermissionSet,
        _ttl_seconds: u32,
        _tags: &[CacheTag],
    ) -> AppResult<()> {
        Ok(())
    }

    async fn invalidate_tag(&self, _tag: CacheTag) -> AppResult<()> {
        Ok(())
    }

    async fn invalidate_all(&self) -> AppResult<()> {
        Ok(())
    }
}
