//! Redis-backed permission set cache.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};
use rentops_application::{CacheTag, CachedPermissionSet, PermissionCache};
use rentops_core::{AppError, AppResult, UserId};
use tracing::debug;

const PUT_ENTRY_SCRIPT: &str = r#"
local ttl = tonumber(ARGV[2])
redis.call('SET', KEYS[1], ARGV[1], 'EX', ttl)
for index = 2, #KEYS do
  redis.call('SADD', KEYS[index], KEYS[1])
  redis.call('EXPIRE', KEYS[index], ttl)
end
return #KEYS
"#;

const DROP_MEMBERS_SCRIPT: &str = r#"
local members = redis.call('SMEMBERS', KEYS[1])
for _, member in ipairs(members) do
  redis.call('DEL', member)
end
redis.call('DEL', KEYS[1])
return #members
"#;

/// Redis implementation of the permission cache port.
///
/// Sets are stored as JSON under `<prefix>:user:<id>`. Tag membership is kept
/// in Redis sets under `<prefix>:tag:<tag>` and every entry is also indexed
/// under `<prefix>:entries` so the whole cache can be dropped without `KEYS`.
#[derive(Clone)]
pub struct RedisPermissionCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisPermissionCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn entry_key(&self, user_id: UserId) -> String {
        format!("{}:user:{user_id}", self.key_prefix)
    }

    fn tag_key(&self, tag: CacheTag) -> String {
        format!("{}:tag:{tag}", self.key_prefix)
    }

    fn index_key(&self) -> String {
        format!("{}:entries", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| {
                AppError::CacheUnavailable(format!("failed to connect to redis: {error}"))
            })
    }

    async fn drop_members(&self, set_key: String) -> AppResult<()> {
        let mut connection = self.connection().await?;
        let script = Script::new(DROP_MEMBERS_SCRIPT);
        let dropped: i64 = script
            .key(&set_key)
            .invoke_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::CacheUnavailable(format!(
                    "failed to invalidate permission cache entries: {error}"
                ))
            })?;

        debug!(set = %set_key, dropped, "permission cache entries dropped");
        Ok(())
    }
}

#[async_trait]
impl PermissionCache for RedisPermissionCache {
    async fn get(&self, user_id: UserId) -> AppResult<Option<CachedPermissionSet>> {
        let key = self.entry_key(user_id);
        let mut connection = self.connection().await?;

        let encoded: Option<String> = connection.get(key).await.map_err(|error| {
            AppError::CacheUnavailable(format!("failed to read permission cache entry: {error}"))
        })?;

        encoded
            .as_deref()
            .map(|value| {
                serde_json::from_str::<CachedPermissionSet>(value).map_err(|error| {
                    AppError::CacheUnavailable(format!(
                        "invalid permission cache entry for user '{user_id}': {error}"
                    ))
                })
            })
            .transpose()
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

        let value = serde_json::to_string(&set).map_err(|error| {
            AppError::CacheUnavailable(format!("failed to encode permission cache entry: {error}"))
        })?;

        let script = Script::new(PUT_ENTRY_SCRIPT);
        let mut invocation = script.prepare_invoke();
        invocation.key(self.entry_key(user_id)).key(self.index_key());
        for tag in tags {
            invocation.key(self.tag_key(*tag));
        }
        invocation.arg(value).arg(ttl_seconds);

        let mut connection = self.connection().await?;
        let _: i64 = invocation
            .invoke_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::CacheUnavailable(format!(
                    "failed to write permission cache entry: {error}"
                ))
            })?;

        Ok(())
    }

    async fn invalidate_tag(&self, tag: CacheTag) -> AppResult<()> {
        self.drop_members(self.tag_key(tag)).await
    }

    async fn invalidate_all(&self) -> AppResult<()> {
        self.drop_members(self.index_key()).await
    }
}
