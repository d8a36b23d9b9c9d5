use std::str::FromStr;

use rentops_core::AppResult;
use rentops_domain::{Action, PermissionGrant, Resource};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Transport form of an `(action, resource)` pair.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/grant-payload.ts"
)]
pub struct GrantPayload {
    pub action: String,
    pub resource: String,
}

impl GrantPayload {
    pub fn to_grant(&self) -> AppResult<PermissionGrant> {
        Ok(PermissionGrant::new(
            Action::from_str(self.action.as_str())?,
            Resource::new(self.resource.as_str())?,
        ))
    }
}
