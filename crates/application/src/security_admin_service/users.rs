use super::*;

impl SecurityAdminService {
    /// Assigns a role to a user.
    pub async fn assign_role(&self, user_id: UserId, role_name: &str) -> AppResult<()> {
        let role = self.require_role(role_name).await?;
        self.repository.assign_role_to_user(user_id, role.id).await?;

        info!(user_id = %user_id, role = %role.name, "role assigned");
        self.authorization_service.invalidate_user(user_id).await;
        Ok(())
    }

    /// Removes a role assignment from a user. Missing assignments are a no-op.
    pub async fn unassign_role(&self, user_id: UserId, role_name: &str) -> AppResult<()> {
        let role = self.require_role(role_name).await?;
        let removed = self
            .repository
            .remove_role_from_user(user_id, role.id)
            .await?;

        info!(user_id = %user_id, role = %role.name, removed, "role unassigned");
        self.authorization_service.invalidate_user(user_id).await;
        Ok(())
    }

    /// Activates or deactivates a user.
    pub async fn set_user_active(&self, user_id: UserId, is_active: bool) -> AppResult<()> {
        self.repository.set_user_active(user_id, is_active).await?;

        info!(user_id = %user_id, is_active, "user status updated");
        self.authorization_service.invalidate_user(user_id).await;
        Ok(())
    }
}
