use super::*;

impl SecurityAdminService {
    /// Links `<action>.<resource>` to a role, creating the permission row when missing.
    ///
    /// Granting an existing link is a no-op. Every cached permission set is
    /// dropped afterwards.
    pub async fn grant(
        &self,
        role_name: &str,
        resource: &Resource,
        action: Action,
    ) -> AppResult<()> {
        let name = PermissionGrant::new(action, resource.clone()).permission_name();
        self.grant_permission(role_name, &name).await
    }

    /// Unlinks `<action>.<resource>` from a role.
    ///
    /// Unknown roles, unknown permissions and missing links are a no-op.
    pub async fn revoke(
        &self,
        role_name: &str,
        resource: &Resource,
        action: Action,
    ) -> AppResult<()> {
        let name = PermissionGrant::new(action, resource.clone()).permission_name();
        self.revoke_permission(role_name, &name).await
    }

    /// Links any permission, including the `*` wildcard, to a role.
    pub async fn grant_permission(
        &self,
        role_name: &str,
        name: &PermissionName,
    ) -> AppResult<()> {
        let permission = self.repository.upsert_permission(name).await?;
        let role = self.require_role(role_name).await?;
        let inserted = self
            .repository
            .insert_role_permission(role.id, permission.id)
            .await?;

        info!(role = %role.name, permission = %name, inserted, "permission granted");
        self.authorization_service.invalidate_all().await;
        Ok(())
    }

    /// Unlinks any permission from a role.
    pub async fn revoke_permission(
        &self,
        role_name: &str,
        name: &PermissionName,
    ) -> AppResult<()> {
        let Some(permission) = self.repository.find_permission_by_name(name).await? else {
            info!(role = %role_name, permission = %name, "revoke skipped, permission unknown");
            return Ok(());
        };
        let Some(role) = self.repository.find_role_by_name(role_name).await? else {
            info!(role = %role_name, permission = %name, "revoke skipped, role unknown");
            return Ok(());
        };

        let removed = self
            .repository
            .delete_role_permission(role.id, permission.id)
            .await?;

        info!(role = %role.name, permission = %name, removed, "permission revoked");
        self.authorization_service.invalidate_all().await;
        Ok(())
    }

    /// Drops every cached permission set.
    pub async fn invalidate_cache(&self) {
        self.authorization_service.invalidate_all().await;
        info!("permission cache invalidated");
    }
}
