use async_trait::async_trait;

use rentops_application::AuthorizationRepository;
use rentops_core::{AppError, AppResult, UserId};
use rentops_domain::{RoleId, RoleRecord, UserAccount};

use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed repository for permission resolution reads.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    name: String,
    is_active: bool,
    role_id: Option<i64>,
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: i64,
    name: String,
}

#[derive(Debug, FromRow)]
struct PermissionNameRow {
    name: String,
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, is_active, role_id
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::StoreUnavailable(format!("failed to load user: {error}")))?;

        Ok(row.map(|row| UserAccount {
            id: UserId::new(row.id),
            email: row.email,
            name: row.name,
            is_active: row.is_active,
            legacy_role_id: row.role_id.map(RoleId::new),
        }))
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleRecord>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT roles.id, roles.name
            FROM roles
            INNER JOIN users
                ON users.role_id = roles.id
            WHERE users.id = $1
            UNION
            SELECT roles.id, roles.name
            FROM roles
            INNER JOIN model_has_roles AS assignments
                ON assignments.role_id = roles.id
            WHERE assignments.user_id = $1
            ORDER BY name
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::StoreUnavailable(format!("failed to load roles for user: {error}"))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| RoleRecord {
                id: RoleId::new(row.id),
                name: row.name,
            })
            .collect())
    }

    async fn list_permission_names_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<String>> {
        let role_ids: Vec<i64> = role_ids.iter().map(RoleId::as_i64).collect();
        let rows = sqlx::query_as::<_, PermissionNameRow>(
            r#"
            SELECT DISTINCT permissions.name
            FROM permissions
            INNER JOIN role_has_permissions AS grants
                ON grants.permission_id = permissions.id
            WHERE grants.role_id = ANY($1)
            "#,
        )
        .bind(role_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::StoreUnavailable(format!("failed to load role permissions: {error}"))
        })?;

        Ok(rows.into_iter().map(|row| row.name).collect())
    }

    async fn list_direct_permission_names(&self, user_id: UserId) -> AppResult<Vec<String>> {
        let rows = sqlx::query_as::<_, PermissionNameRow>(
            r#"
            SELECT DISTINCT permissions.name
            FROM permissions
            INNER JOIN model_has_permissions AS grants
                ON grants.permission_id = permissions.id
            WHERE grants.user_id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::StoreUnavailable(format!("failed to load direct permissions: {error}"))
        })?;

        Ok(rows.into_iter().map(|row| row.name).collect())
    }
}
