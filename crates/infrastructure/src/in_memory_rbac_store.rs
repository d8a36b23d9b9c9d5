use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use rentops_application::{
    AuthorizationRepository, RoleDefinition, RoutePermissionOverride, RoutePermissionRepository,
    SecurityAdminRepository,
};
use rentops_core::{AppError, AppResult, UserId};
use rentops_domain::{
    PermissionGrant, PermissionId, PermissionName, PermissionRecord, RoleId, RoleRecord,
    UserAccount,
};

#[derive(Debug, Default)]
struct RbacState {
    next_id: i64,
    users: BTreeMap<UserId, UserAccount>,
    roles: BTreeMap<RoleId, String>,
    permissions: BTreeMap<PermissionId, String>,
    role_permissions: BTreeSet<(RoleId, PermissionId)>,
    user_roles: BTreeSet<(UserId, RoleId)>,
    user_permissions: BTreeSet<(UserId, PermissionId)>,
    route_permissions: HashMap<String, PermissionGrant>,
}

impl RbacState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn find_role(&self, role_name: &str) -> Option<RoleRecord> {
        self.roles
            .iter()
            .find(|(_, name)| name.as_str() == role_name)
            .map(|(id, name)| RoleRecord {
                id: *id,
                name: name.clone(),
            })
    }

    fn find_permission(&self, name: &str) -> Option<PermissionId> {
        self.permissions
            .iter()
            .find(|(_, stored)| stored.as_str() == name)
            .map(|(id, _)| *id)
    }

    fn ensure_permission(&mut self, name: &str) -> PermissionId {
        if let Some(id) = self.find_permission(name) {
            return id;
        }

        let id = PermissionId::new(self.allocate_id());
        self.permissions.insert(id, name.to_owned());
        id
    }

    fn permission_names<'a>(&'a self, ids: impl Iterator<Item = &'a PermissionId>) -> Vec<String> {
        ids.filter_map(|id| self.permissions.get(id).cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Process-local RBAC store implementing every repository port.
///
/// Used for local development without PostgreSQL and in tests. Identifiers
/// are allocated from one shared sequence.
#[derive(Debug, Default)]
pub struct InMemoryRbacStore {
    state: RwLock<RbacState>,
}

impl InMemoryRbacStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user and returns its identifier.
    pub async fn insert_user(&self, email: &str, name: &str, is_active: bool) -> UserId {
        let mut state = self.state.write().await;
        let user_id = UserId::new(state.allocate_id());
        state.users.insert(
            user_id,
            UserAccount {
                id: user_id,
                email: email.to_owned(),
                name: name.to_owned(),
                is_active,
                legacy_role_id: None,
            },
        );
        user_id
    }

    /// Sets the legacy single-role column of a user.
    pub async fn set_legacy_role(&self, user_id: UserId, role_id: Option<RoleId>) -> AppResult<()> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        user.legacy_role_id = role_id;
        Ok(())
    }

    /// Grants a stored permission name directly to a user.
    pub async fn grant_user_permission(&self, user_id: UserId, name: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' does not exist"
            )));
        }

        let permission_id = state.ensure_permission(name);
        state.user_permissions.insert((user_id, permission_id));
        Ok(())
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryRbacStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleRecord>> {
        let state = self.state.read().await;
        let legacy = state
            .users
            .get(&user_id)
            .and_then(|user| user.legacy_role_id);

        Ok(state
            .roles
            .iter()
            .filter(|(role_id, _)| {
                legacy == Some(**role_id) || state.user_roles.contains(&(user_id, **role_id))
            })
            .map(|(id, name)| RoleRecord {
                id: *id,
                name: name.clone(),
            })
            .collect())
    }

    async fn list_permission_names_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<String>> {
        let state = self.state.read().await;
        let ids = state
            .role_permissions
            .iter()
            .filter(|(role_id, _)| role_ids.contains(role_id))
            .map(|(_, permission_id)| permission_id);

        Ok(state.permission_names(ids))
    }

    async fn list_direct_permission_names(&self, user_id: UserId) -> AppResult<Vec<String>> {
        let state = self.state.read().await;
        let ids = state
            .user_permissions
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, permission_id)| permission_id);

        Ok(state.permission_names(ids))
    }
}

#[async_trait]
impl SecurityAdminRepository for InMemoryRbacStore {
    async fn upsert_permission(&self, name: &PermissionName) -> AppResult<PermissionRecord> {
        let id = self.state.write().await.ensure_permission(&name.to_string());
        Ok(PermissionRecord {
            id,
            name: name.clone(),
        })
    }

    async fn find_permission_by_name(
        &self,
        name: &PermissionName,
    ) -> AppResult<Option<PermissionRecord>> {
        Ok(self
            .state
            .read()
            .await
            .find_permission(&name.to_string())
            .map(|id| PermissionRecord {
                id,
                name: name.clone(),
            }))
    }

    async fn find_role_by_name(&self, role_name: &str) -> AppResult<Option<RoleRecord>> {
        Ok(self.state.read().await.find_role(role_name))
    }

    async fn insert_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .role_permissions
            .insert((role_id, permission_id)))
    }

    async fn delete_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .role_permissions
            .remove(&(role_id, permission_id)))
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        let state = self.state.read().await;
        let mut roles: Vec<RoleDefinition> = state
            .roles
            .iter()
            .map(|(role_id, name)| RoleDefinition {
                role_id: *role_id,
                name: name.clone(),
                permissions: state.permission_names(
                    state
                        .role_permissions
                        .iter()
                        .filter(|(owner, _)| owner == role_id)
                        .map(|(_, permission_id)| permission_id),
                ),
            })
            .collect();
        roles.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(roles)
    }

    async fn create_role_with_permissions(
        &self,
        role_name: &str,
        permissions: &[PermissionName],
    ) -> AppResult<RoleRecord> {
        let mut state = self.state.write().await;
        if state.find_role(role_name).is_some() {
            return Err(AppError::Conflict(format!(
                "role '{role_name}' already exists"
            )));
        }

        let id = RoleId::new(state.allocate_id());
        state.roles.insert(id, role_name.to_owned());
        for permission in permissions {
            let permission_id = state.ensure_permission(&permission.to_string());
            state.role_permissions.insert((id, permission_id));
        }

        Ok(RoleRecord {
            id,
            name: role_name.to_owned(),
        })
    }

    async fn ensure_role(&self, role_name: &str) -> AppResult<RoleRecord> {
        let mut state = self.state.write().await;
        if let Some(role) = state.find_role(role_name) {
            return Ok(role);
        }

        let id = RoleId::new(state.allocate_id());
        state.roles.insert(id, role_name.to_owned());
        Ok(RoleRecord {
            id,
            name: role_name.to_owned(),
        })
    }

    async fn assign_role_to_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' does not exist"
            )));
        }

        state.user_roles.insert((user_id, role_id));
        Ok(())
    }

    async fn remove_role_from_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .user_roles
            .remove(&(user_id, role_id)))
    }

    async fn set_user_active(&self, user_id: UserId, is_active: bool) -> AppResult<()> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        user.is_active = is_active;
        Ok(())
    }
}

#[async_trait]
impl RoutePermissionRepository for InMemoryRbacStore {
    async fn find_route_permission(&self, route_key: &str) -> AppResult<Option<PermissionGrant>> {
        Ok(self
            .state
            .read()
            .await
            .route_permissions
            .get(route_key)
            .cloned())
    }

    async fn list_route_permissions(&self) -> AppResult<Vec<RoutePermissionOverride>> {
        let state = self.state.read().await;
        let mut overrides: Vec<RoutePermissionOverride> = state
            .route_permissions
            .iter()
            .map(|(route_key, grant)| RoutePermissionOverride {
                route_key: route_key.clone(),
                grant: grant.clone(),
            })
            .collect();
        overrides.sort_by(|left, right| left.route_key.cmp(&right.route_key));
        Ok(overrides)
    }

    async fn save_route_permission(
        &self,
        route_key: &str,
        grant: &PermissionGrant,
    ) -> AppResult<()> {
        self.state
            .write()
            .await
            .route_permissions
            .insert(route_key.to_owned(), grant.clone());
        Ok(())
    }
}
