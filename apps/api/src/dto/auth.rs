use rentops_application::CachedPermissionSet;
use rentops_core::{UserId, UserIdentity};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for token-protected session bootstrap.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/bootstrap-request.ts"
)]
pub struct BootstrapRequest {
    pub user_id: i64,
    pub token: String,
}

impl BootstrapRequest {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.user_id)
    }
}

/// API representation of the authenticated user and their access.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/current-user-response.ts"
)]
pub struct CurrentUserResponse {
    pub user_id: i64,
    pub display_name: String,
    pub email: Option<String>,
    pub declared_role: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub accessible_routes: Vec<String>,
}

impl CurrentUserResponse {
    pub fn new(
        identity: UserIdentity,
        permission_set: Option<CachedPermissionSet>,
        accessible_routes: Vec<&'static str>,
    ) -> Self {
        let (roles, permissions) = permission_set
            .map(|set| {
                (
                    set.roles,
                    set.permissions
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>(),
                )
            })
            .unwrap_or_default();

        Self {
            user_id: identity.user_id().as_i64(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().map(ToOwned::to_owned),
            declared_role: identity.declared_role().map(ToOwned::to_owned),
            roles,
            permissions,
            accessible_routes: accessible_routes
                .into_iter()
                .map(ToOwned::to_owned)
                .collect(),
        }
    }
}
