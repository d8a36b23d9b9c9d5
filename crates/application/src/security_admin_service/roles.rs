use super::*;

impl SecurityAdminService {
    /// Returns all roles with linked permissions.
    pub async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        self.repository.list_roles().await
    }

    /// Creates a custom role and links the requested permissions.
    pub async fn create_role(&self, input: CreateRoleInput) -> AppResult<RoleDefinition> {
        let name = NonEmptyString::new(input.name.trim())?;

        let role = self
            .repository
            .create_role_with_permissions(name.as_str(), &input.permissions)
            .await?;
        let permissions: Vec<String> = input
            .permissions
            .iter()
            .map(ToString::to_string)
            .collect();

        info!(role = %role.name, permissions = permissions.len(), "role created");
        if !permissions.is_empty() {
            self.authorization_service.invalidate_all().await;
        }

        Ok(RoleDefinition {
            role_id: role.id,
            name: role.name,
            permissions,
        })
    }

    /// Ensures the shipped roles exist with their default permissions.
    ///
    /// Existing links are kept, so the operation can run on every deploy.
    pub async fn seed_system_roles(&self) -> AppResult<SeedSummary> {
        let mut summary = SeedSummary::default();

        for system_role in SystemRole::all() {
            let role = self.repository.ensure_role(system_role.as_str()).await?;
            summary.roles += 1;

            for permission_name in system_role.default_permissions() {
                let permission = self.repository.upsert_permission(&permission_name).await?;
                if self
                    .repository
                    .insert_role_permission(role.id, permission.id)
                    .await?
                {
                    summary.grants_inserted += 1;
                }
            }
        }

        info!(
            roles = summary.roles,
            grants_inserted = summary.grants_inserted,
            "system roles seeded"
        );
        self.authorization_service.invalidate_all().await;
        Ok(summary)
    }
}
