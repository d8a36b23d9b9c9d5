use std::sync::Arc;

use rentops_application::{
    AuthorizationRepository, AuthorizationService, RouteAccessService, SecurityAdminService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub security_admin_service: SecurityAdminService,
    pub route_access_service: RouteAccessService,
    pub account_repository: Arc<dyn AuthorizationRepository>,
    pub bootstrap_token: String,
}
