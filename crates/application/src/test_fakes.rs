use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use rentops_core::{AppError, AppResult, UserId, UserIdentity};
use rentops_domain::{
    PermissionGrant, PermissionId, PermissionName, PermissionRecord, RoleId, RoleRecord,
    UserAccount,
};

use crate::{
    AuthorizationRepository, AuthorizationService, CacheTag, CachedPermissionSet,
    PermissionCache, RoleDefinition, RoutePermissionOverride, RoutePermissionRepository,
    SecurityAdminRepository,
};

#[derive(Clone, Default)]
struct FakeState {
    next_id: i64,
    users: HashMap<UserId, UserAccount>,
    roles: Vec<RoleRecord>,
    permissions: Vec<(PermissionId, String)>,
    role_permissions: BTreeSet<(RoleId, PermissionId)>,
    user_roles: BTreeSet<(UserId, RoleId)>,
    user_permissions: Vec<(UserId, String)>,
    routes: HashMap<String, PermissionGrant>,
}

impl FakeState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn permission_id(&mut self, name: &str) -> PermissionId {
        if let Some((id, _)) = self.permissions.iter().find(|(_, stored)| stored == name) {
            return *id;
        }

        let id = PermissionId::new(self.next_id());
        self.permissions.push((id, name.to_owned()));
        id
    }
}

/// In-process RBAC store shared by the service tests.
#[derive(Default)]
pub(crate) struct FakeRbacStore {
    state: Mutex<FakeState>,
    fail_reads: AtomicBool,
    fail_routes: AtomicBool,
    fail_permission_writes: AtomicBool,
    user_lookups: AtomicUsize,
}

impl FakeRbacStore {
    pub(crate) async fn add_user(&self, user_id: i64, is_active: bool) -> UserId {
        let user_id = UserId::new(user_id);
        self.state.lock().await.users.insert(
            user_id,
            UserAccount {
                id: user_id,
                email: format!("user{user_id}@example.com"),
                name: format!("User {user_id}"),
                is_active,
                legacy_role_id: None,
            },
        );
        user_id
    }

    pub(crate) async fn set_legacy_role(&self, user_id: UserId, role_id: RoleId) {
        if let Some(user) = self.state.lock().await.users.get_mut(&user_id) {
            user.legacy_role_id = Some(role_id);
        }
    }

    pub(crate) async fn add_role(&self, name: &str) -> RoleId {
        let mut state = self.state.lock().await;
        let id = RoleId::new(state.next_id());
        state.roles.push(RoleRecord {
            id,
            name: name.to_owned(),
        });
        id
    }

    pub(crate) async fn link_raw_permission(&self, role_id: RoleId, name: &str) {
        let mut state = self.state.lock().await;
        let permission_id = state.permission_id(name);
        state.role_permissions.insert((role_id, permission_id));
    }

    pub(crate) async fn assign(&self, user_id: UserId, role_id: RoleId) {
        self.state.lock().await.user_roles.insert((user_id, role_id));
    }

    pub(crate) async fn add_direct_permission(&self, user_id: UserId, name: &str) {
        self.state
            .lock()
            .await
            .user_permissions
            .push((user_id, name.to_owned()));
    }

    pub(crate) async fn role_permission_count(&self) -> usize {
        self.state.lock().await.role_permissions.len()
    }

    pub(crate) fn fail_reads(&self, failing: bool) {
        self.fail_reads.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn fail_routes(&self, failing: bool) {
        self.fail_routes.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn fail_permission_writes(&self, failing: bool) {
        self.fail_permission_writes.store(failing, Ordering::SeqCst);
    }

    pub(crate) async fn role_names(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .roles
            .iter()
            .map(|role| role.name.clone())
            .collect()
    }

    pub(crate) fn user_lookups(&self) -> usize {
        self.user_lookups.load(Ordering::SeqCst)
    }

    fn check_permission_writes(&self) -> AppResult<()> {
        if self.fail_permission_writes.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable("permission write rejected".to_owned()));
        }
        Ok(())
    }

    fn check_reads(&self) -> AppResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable("connection refused".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthorizationRepository for FakeRbacStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleRecord>> {
        self.check_reads()?;
        let state = self.state.lock().await;
        let legacy = state
            .users
            .get(&user_id)
            .and_then(|user| user.legacy_role_id);

        Ok(state
            .roles
            .iter()
            .filter(|role| {
                legacy == Some(role.id) || state.user_roles.contains(&(user_id, role.id))
            })
            .cloned()
            .collect())
    }

    async fn list_permission_names_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<String>> {
        self.check_reads()?;
        let state = self.state.lock().await;
        Ok(state
            .permissions
            .iter()
            .filter(|(permission_id, _)| {
                role_ids
                    .iter()
                    .any(|role_id| state.role_permissions.contains(&(*role_id, *permission_id)))
            })
            .map(|(_, name)| name.clone())
            .collect())
    }

    async fn list_direct_permission_names(&self, user_id: UserId) -> AppResult<Vec<String>> {
        self.check_reads()?;
        Ok(self
            .state
            .lock()
            .await
            .user_permissions
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, name)| name.clone())
            .collect())
    }
}

#[async_trait]
impl SecurityAdminRepository for FakeRbacStore {
    async fn upsert_permission(&self, name: &PermissionName) -> AppResult<PermissionRecord> {
        self.check_permission_writes()?;
        let id = self.state.lock().await.permission_id(&name.to_string());
        Ok(PermissionRecord {
            id,
            name: name.clone(),
        })
    }

    async fn find_permission_by_name(
        &self,
        name: &PermissionName,
    ) -> AppResult<Option<PermissionRecord>> {
        let rendered = name.to_string();
        Ok(self
            .state
            .lock()
            .await
            .permissions
            .iter()
            .find(|(_, stored)| *stored == rendered)
            .map(|(id, _)| PermissionRecord {
                id: *id,
                name: name.clone(),
            }))
    }

    async fn find_role_by_name(&self, role_name: &str) -> AppResult<Option<RoleRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .iter()
            .find(|role| role.name == role_name)
            .cloned())
    }

    async fn insert_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        Ok(self
            .state
            .lock()
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
            .lock()
            .await
            .role_permissions
            .remove(&(role_id, permission_id)))
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        let state = self.state.lock().await;
        Ok(state
            .roles
            .iter()
            .map(|role| RoleDefinition {
                role_id: role.id,
                name: role.name.clone(),
                permissions: state
                    .permissions
                    .iter()
                    .filter(|(id, _)| state.role_permissions.contains(&(role.id, *id)))
                    .map(|(_, name)| name.clone())
                    .collect(),
            })
            .collect())
    }

    async fn create_role_with_permissions(
        &self,
        role_name: &str,
        permissions: &[PermissionName],
    ) -> AppResult<RoleRecord> {
        let mut state = self.state.lock().await;
        if state.roles.iter().any(|role| role.name == role_name) {
            return Err(AppError::Conflict(format!("role '{role_name}' already exists")));
        }

        // Staged copy stands in for the transaction.
        let mut staged = state.clone();
        let role = RoleRecord {
            id: RoleId::new(staged.next_id()),
            name: role_name.to_owned(),
        };
        staged.roles.push(role.clone());

        for permission in permissions {
            self.check_permission_writes()?;
            let permission_id = staged.permission_id(&permission.to_string());
            staged.role_permissions.insert((role.id, permission_id));
        }

        *state = staged;
        Ok(role)
    }

    async fn ensure_role(&self, role_name: &str) -> AppResult<RoleRecord> {
        if let Some(role) = self.find_role_by_name(role_name).await? {
            return Ok(role);
        }

        let id = self.add_role(role_name).await;
        Ok(RoleRecord {
            id,
            name: role_name.to_owned(),
        })
    }

    async fn assign_role_to_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }

        state.user_roles.insert((user_id, role_id));
        Ok(())
    }

    async fn remove_role_from_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        Ok(self
            .state
            .lock()
            .await
            .user_roles
            .remove(&(user_id, role_id)))
    }

    async fn set_user_active(&self, user_id: UserId, is_active: bool) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        user.is_active = is_active;
        Ok(())
    }
}

#[async_trait]
impl RoutePermissionRepository for FakeRbacStore {
    async fn find_route_permission(&self, route_key: &str) -> AppResult<Option<PermissionGrant>> {
        if self.fail_routes.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable("connection refused".to_owned()));
        }

        Ok(self.state.lock().await.routes.get(route_key).cloned())
    }

    async fn list_route_permissions(&self) -> AppResult<Vec<RoutePermissionOverride>> {
        if self.fail_routes.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable("connection refused".to_owned()));
        }

        Ok(self
            .state
            .lock()
            .await
            .routes
            .iter()
            .map(|(route_key, grant)| RoutePermissionOverride {
                route_key: route_key.clone(),
                grant: grant.clone(),
            })
            .collect())
    }

    async fn save_route_permission(
        &self,
        route_key: &str,
        grant: &PermissionGrant,
    ) -> AppResult<()> {
        self.state
            .lock()
            .await
            .routes
            .insert(route_key.to_owned(), grant.clone());
        Ok(())
    }
}

/// Cache fake recording writes and able to simulate an outage.
#[derive(Default)]
pub(crate) struct FakePermissionCache {
    entries: Mutex<HashMap<UserId, (CachedPermissionSet, Vec<CacheTag>)>>,
    unavailable: AtomicBool,
    puts: AtomicUsize,
}

impl FakePermissionCache {
    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub(crate) fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub(crate) async fn contains(&self, user_id: UserId) -> bool {
        self.entries.lock().await.contains_key(&user_id)
    }

    pub(crate) async fn insert_raw(&self, key: UserId, set: CachedPermissionSet) {
        self.entries.lock().await.insert(key, (set, Vec::new()));
    }

    fn check(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::CacheUnavailable("cache offline".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl PermissionCache for FakePermissionCache {
    async fn get(&self, user_id: UserId) -> AppResult<Option<CachedPermissionSet>> {
        self.check()?;
        Ok(self
            .entries
            .lock()
            .await
            .get(&user_id)
            .map(|(set, _)| set.clone()))
    }

    async fn put(
        &self,
        user_id: UserId,
        set: CachedPermissionSet,
        _ttl_seconds: u32,
        tags: &[CacheTag],
    ) -> AppResult<()> {
        self.check()?;
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .await
            .insert(user_id, (set, tags.to_vec()));
        Ok(())
    }

    async fn invalidate_tag(&self, tag: CacheTag) -> AppResult<()> {
        self.check()?;
        self.entries
            .lock()
            .await
            .retain(|_, (_, tags)| !tags.contains(&tag));
        Ok(())
    }

    async fn invalidate_all(&self) -> AppResult<()> {
        self.check()?;
        self.entries.lock().await.clear();
        Ok(())
    }
}

pub(crate) struct Harness {
    pub(crate) store: Arc<FakeRbacStore>,
    pub(crate) cache: Arc<FakePermissionCache>,
    pub(crate) authorization: AuthorizationService,
}

pub(crate) fn harness() -> Harness {
    let store = Arc::new(FakeRbacStore::default());
    let cache = Arc::new(FakePermissionCache::default());
    let authorization = AuthorizationService::new(store.clone(), cache.clone());

    Harness {
        store,
        cache,
        authorization,
    }
}

pub(crate) fn grant(value: &str) -> PermissionGrant {
    match PermissionName::from_str(value) {
        Ok(PermissionName::Scoped(grant)) => grant,
        other => panic!("expected scoped permission, got {other:?}"),
    }
}

pub(crate) fn identity(user_id: UserId, declared_role: Option<&str>) -> UserIdentity {
    UserIdentity::new(
        user_id,
        format!("User {user_id}"),
        None,
        declared_role.map(str::to_owned),
    )
}
