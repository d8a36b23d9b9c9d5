use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use rentops_application::{RoleDefinition, SecurityAdminRepository};
use rentops_core::{AppError, AppResult, UserId};
use rentops_domain::{PermissionId, PermissionName, PermissionRecord, RoleId, RoleRecord};

#[cfg(test)]
mod tests;

/// PostgreSQL-backed repository for role, grant and user administration.
#[derive(Clone)]
pub struct PostgresSecurityAdminRepository {
    pool: PgPool,
}

impl PostgresSecurityAdminRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: i64,
    name: String,
}

#[derive(Debug, FromRow)]
struct RoleWithPermissionRow {
    role_id: i64,
    role_name: String,
    permission: Option<String>,
}

#[async_trait]
impl SecurityAdminRepository for PostgresSecurityAdminRepository {
    async fn upsert_permission(&self, name: &PermissionName) -> AppResult<PermissionRecord> {
        let permission_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO permissions (name, guard_name)
            VALUES ($1, 'web')
            ON CONFLICT (name) DO UPDATE
            SET updated_at = now()
            RETURNING id
            "#,
        )
        .bind(name.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::StoreUnavailable(format!("failed to upsert permission '{name}': {error}"))
        })?;

        Ok(PermissionRecord {
            id: PermissionId::new(permission_id),
            name: name.clone(),
        })
    }

    async fn find_permission_by_name(
        &self,
        name: &PermissionName,
    ) -> AppResult<Option<PermissionRecord>> {
        let permission_id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id
            FROM permissions
            WHERE name = $1
            "#,
        )
        .bind(name.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::StoreUnavailable(format!("failed to load permission '{name}': {error}"))
        })?;

        Ok(permission_id.map(|permission_id| PermissionRecord {
            id: PermissionId::new(permission_id),
            name: name.clone(),
        }))
    }

    async fn find_role_by_name(&self, role_name: &str) -> AppResult<Option<RoleRecord>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(role_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::StoreUnavailable(format!("failed to load role '{role_name}': {error}"))
        })?;

        Ok(row.map(role_record))
    }

    async fn insert_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            INSERT INTO role_has_permissions (permission_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (permission_id, role_id) DO NOTHING
            "#,
        )
        .bind(permission_id.as_i64())
        .bind(role_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::StoreUnavailable(format!("failed to grant permission: {error}")))?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn delete_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM role_has_permissions
            WHERE permission_id = $1
                AND role_id = $2
            "#,
        )
        .bind(permission_id.as_i64())
        .bind(role_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::StoreUnavailable(format!("failed to revoke permission: {error}"))
        })?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        let rows = sqlx::query_as::<_, RoleWithPermissionRow>(
            r#"
            SELECT
                roles.id AS role_id,
                roles.name AS role_name,
                permissions.name AS permission
            FROM roles
            LEFT JOIN role_has_permissions AS grants
                ON grants.role_id = roles.id
            LEFT JOIN permissions
                ON permissions.id = grants.permission_id
            ORDER BY roles.name, permissions.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::StoreUnavailable(format!("failed to list roles: {error}")))?;

        Ok(aggregate_roles(rows))
    }

    async fn create_role_with_permissions(
        &self,
        role_name: &str,
        permissions: &[PermissionName],
    ) -> AppResult<RoleRecord> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::StoreUnavailable(format!("failed to begin transaction: {error}"))
        })?;

        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO roles (name, guard_name)
            VALUES ($1, 'web')
            RETURNING id, name
            "#,
        )
        .bind(role_name)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_role_conflict(error, role_name))?;

        for permission in permissions {
            sqlx::query(
                r#"
                WITH permission AS (
                    INSERT INTO permissions (name, guard_name)
                    VALUES ($1, 'web')
                    ON CONFLICT (name) DO UPDATE
                    SET updated_at = now()
                    RETURNING id
                )
                INSERT INTO role_has_permissions (permission_id, role_id)
                SELECT permission.id, $2
                FROM permission
                ON CONFLICT (permission_id, role_id) DO NOTHING
                "#,
            )
            .bind(permission.to_string())
            .bind(row.id)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::StoreUnavailable(format!(
                    "failed to link permission '{permission}' to role '{role_name}': {error}"
                ))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::StoreUnavailable(format!("failed to commit transaction: {error}"))
        })?;

        Ok(role_record(row))
    }

    async fn ensure_role(&self, role_name: &str) -> AppResult<RoleRecord> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO roles (name, guard_name)
            VALUES ($1, 'web')
            ON CONFLICT (name) DO UPDATE
            SET updated_at = now()
            RETURNING id, name
            "#,
        )
        .bind(role_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::StoreUnavailable(format!("failed to ensure role '{role_name}': {error}"))
        })?;

        Ok(role_record(row))
    }

    async fn assign_role_to_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::StoreUnavailable(format!("failed to begin transaction: {error}"))
        })?;

        let user_exists = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::StoreUnavailable(format!("failed to resolve user: {error}")))?;

        if user_exists == 0 {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' does not exist"
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO model_has_roles (role_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (role_id, user_id) DO NOTHING
            "#,
        )
        .bind(role_id.as_i64())
        .bind(user_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::StoreUnavailable(format!("failed to assign role: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::StoreUnavailable(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }

    async fn remove_role_from_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM model_has_roles
            WHERE role_id = $1
                AND user_id = $2
            "#,
        )
        .bind(role_id.as_i64())
        .bind(user_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::StoreUnavailable(format!("failed to remove role assignment: {error}"))
        })?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn set_user_active(&self, user_id: UserId, is_active: bool) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET is_active = $2,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .bind(is_active)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::StoreUnavailable(format!("failed to update user status: {error}"))
        })?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' does not exist"
            )));
        }

        Ok(())
    }
}

fn role_record(row: RoleRow) -> RoleRecord {
    RoleRecord {
        id: RoleId::new(row.id),
        name: row.name,
    }
}

fn aggregate_roles(rows: Vec<RoleWithPermissionRow>) -> Vec<RoleDefinition> {
    let mut by_name: BTreeMap<String, RoleDefinition> = BTreeMap::new();

    for row in rows {
        let role = by_name
            .entry(row.role_name.clone())
            .or_insert_with(|| RoleDefinition {
                role_id: RoleId::new(row.role_id),
                name: row.role_name,
                permissions: Vec::new(),
            });

        if let Some(permission) = row.permission {
            role.permissions.push(permission);
        }
    }

    by_name.into_values().collect()
}

fn map_role_conflict(error: sqlx::Error, role_name: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("role '{role_name}' already exists"));
    }

    AppError::StoreUnavailable(format!("failed to create role: {error}"))
}

