use super::*;

impl AuthorizationService {
    /// Returns whether the user may perform the action on the resource.
    ///
    /// Never fails: unknown users, inactive users and store errors all
    /// resolve to `false`.
    pub async fn can(&self, user_id: UserId, action: Action, resource: &Resource) -> bool {
        match self.resolve_permission_set(user_id).await {
            Ok(Some(set)) => set.allows(action, resource),
            Ok(None) => false,
            Err(error) => {
                warn!(
                    user_id = %user_id,
                    action = %action,
                    resource = %resource,
                    error = %error,
                    "permission check failed, denying"
                );
                false
            }
        }
    }

    /// Returns whether the user holds at least one of the grants.
    ///
    /// An empty list yields `false`.
    pub async fn can_any(&self, user_id: UserId, grants: &[PermissionGrant]) -> bool {
        if grants.is_empty() {
            return false;
        }

        match self.resolve_or_deny(user_id).await {
            Some(set) => grants
                .iter()
                .any(|grant| set.allows(grant.action, &grant.resource)),
            None => false,
        }
    }

    /// Returns whether the user holds every one of the grants.
    ///
    /// An empty list yields `true`, also for unknown users.
    pub async fn can_all(&self, user_id: UserId, grants: &[PermissionGrant]) -> bool {
        if grants.is_empty() {
            return true;
        }

        match self.resolve_or_deny(user_id).await {
            Some(set) => grants
                .iter()
                .all(|grant| set.allows(grant.action, &grant.resource)),
            None => false,
        }
    }

    /// Ensures the identity holds the grant.
    pub async fn require_permission(
        &self,
        identity: &UserIdentity,
        grant: &PermissionGrant,
    ) -> AppResult<()> {
        if self
            .can(identity.user_id(), grant.action, &grant.resource)
            .await
        {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' is missing permission '{grant}'",
            identity.user_id()
        )))
    }

    /// Returns the resolved roles and permissions of an active user.
    ///
    /// Unlike the boolean checks, store failures are propagated.
    pub async fn effective_permissions(
        &self,
        user_id: UserId,
    ) -> AppResult<Option<CachedPermissionSet>> {
        self.resolve_permission_set(user_id).await
    }
}
