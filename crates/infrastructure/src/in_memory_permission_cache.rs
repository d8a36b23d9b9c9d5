use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rentops_application::{CacheTag, CachedPermissionSet, PermissionCache};
use rentops_core::{AppResult, UserId};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct PermissionCacheEntry {
    set: CachedPermissionSet,
    tags: Vec<CacheTag>,
    expires_at: Instant,
}

/// In-memory cache adapter for resolved permission sets.
///
/// Entries live in the current process only; each API instance keeps its own.
#[derive(Default)]
pub struct InMemoryPermissionCache {
    entries: RwLock<HashMap<UserId, PermissionCacheEntry>>,
}

impl InMemoryPermissionCache {
    /// Creates an empty in-memory permission cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionCache for InMemoryPermissionCache {
    async fn get(&self, user_id: UserId) -> AppResult<Option<CachedPermissionSet>> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&user_id) {
                if entry.expires_at > Instant::now() {
                    return Ok(Some(entry.set.clone()));
                }
            } else {
                return Ok(None);
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(&user_id)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(&user_id);
        }

        Ok(None)
    }

    async fn put(
        &self,
        user_id: UserId,
        set: CachedPermissionSet,
        ttl_seconds: u32,
        tags: &[CacheTag],
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        self.entries.write().await.insert(
            user_id,
            PermissionCacheEntry {
                set,
                tags: tags.to_vec(),
                expires_at,
            },
        );

        Ok(())
    }

    async fn invalidate_tag(&self, tag: CacheTag) -> AppResult<()> {
        self.entries
            .write()
            .await
            .retain(|_, entry| !entry.tags.contains(&tag));
        Ok(())
    }

    async fn invalidate_all(&self) -> AppResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}
