use super::*;

impl AuthorizationService {
    pub(super) async fn lookup_cached(&self, user_id: UserId) -> CacheLookup {
        match self.cache.get(user_id).await {
            Ok(Some(set)) if set.user_id == user_id => CacheLookup::Hit(set),
            Ok(Some(set)) => {
                warn!(
                    user_id = %user_id,
                    cached_user_id = %set.user_id,
                    "discarding permission cache entry stored for another user"
                );
                CacheLookup::Miss
            }
            Ok(None) => CacheLookup::Miss,
            Err(error) => {
                warn!(
                    user_id = %user_id,
                    error = %error,
                    "permission cache unavailable, resolving from store"
                );
                CacheLookup::Unavailable
            }
        }
    }

    pub(super) async fn populate_cache(&self, set: &CachedPermissionSet) {
        if self.cache_ttl_seconds == 0 {
            return;
        }

        let user_id = set.user_id;
        if let Err(error) = self
            .cache
            .put(
                user_id,
                set.clone(),
                self.cache_ttl_seconds,
                &CacheTag::for_user(user_id),
            )
            .await
        {
            warn!(user_id = %user_id, error = %error, "failed to populate permission cache");
        }
    }

    /// Drops every cached permission set.
    ///
    /// Cache failures are logged; entries then expire through their ttl.
    pub async fn invalidate_all(&self) {
        if let Err(error) = self.cache.invalidate_all().await {
            warn!(error = %error, "failed to invalidate permission cache");
        }
    }

    /// Drops the cached permission set of one user.
    pub async fn invalidate_user(&self, user_id: UserId) {
        if let Err(error) = self.cache.invalidate_tag(CacheTag::User(user_id)).await {
            warn!(
                user_id = %user_id,
                error = %error,
                "failed to invalidate cached permissions for user"
            );
        }
    }
}
