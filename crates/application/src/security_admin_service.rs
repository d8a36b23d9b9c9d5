use std::sync::Arc;

use rentops_core::{AppError, AppResult, NonEmptyString, UserId};
use rentops_domain::{Action, PermissionGrant, PermissionName, Resource, RoleRecord, SystemRole};
use tracing::info;

use crate::AuthorizationService;
use crate::security_admin_ports::{
    CreateRoleInput, RoleDefinition, SecurityAdminRepository, SeedSummary,
};

mod grants;
mod roles;
mod users;


/// Application service for role, grant and user administration.
///
/// Route guards enforce who may call these operations; the service itself
/// only keeps the store and the permission cache consistent.
#[derive(Clone)]
pub struct SecurityAdminService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn SecurityAdminRepository>,
}

impl SecurityAdminService {
    /// Creates a new security admin service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn SecurityAdminRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
        }
    }

    async fn require_role(&self, role_name: &str) -> AppResult<RoleRecord> {
        self.repository
            .find_role_by_name(role_name)
            .await?
            .ok_or_else(|| AppError::RoleNotFound(role_name.to_owned()))
    }
}
