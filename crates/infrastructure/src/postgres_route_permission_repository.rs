use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use rentops_application::{RoutePermissionOverride, RoutePermissionRepository};
use rentops_core::{AppError, AppResult};
use rentops_domain::{Action, PermissionGrant, Resource};

/// PostgreSQL-backed repository for route permission overrides.
#[derive(Clone)]
pub struct PostgresRoutePermissionRepository {
    pool: PgPool,
}

impl PostgresRoutePermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoutePermissionRow {
    route_key: String,
    action: String,
    resource: String,
}

impl RoutePermissionRow {
    fn grant(&self) -> AppResult<PermissionGrant> {
        let action = Action::from_str(&self.action).map_err(|error| {
            AppError::StoreUnavailable(format!(
                "route '{}' has an invalid stored action: {error}",
                self.route_key
            ))
        })?;
        let resource = Resource::new(self.resource.as_str()).map_err(|error| {
            AppError::StoreUnavailable(format!(
                "route '{}' has an invalid stored resource: {error}",
                self.route_key
            ))
        })?;

        Ok(PermissionGrant::new(action, resource))
    }
}

#[async_trait]
impl RoutePermissionRepository for PostgresRoutePermissionRepository {
    async fn find_route_permission(&self, route_key: &str) -> AppResult<Option<PermissionGrant>> {
        let row = sqlx::query_as::<_, RoutePermissionRow>(
            r#"
            SELECT route_key, action, resource
            FROM route_permissions
            WHERE route_key = $1
            "#,
        )
        .bind(route_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::StoreUnavailable(format!(
                "failed to load route permission '{route_key}': {error}"
            ))
        })?;

        row.as_ref().map(RoutePermissionRow::grant).transpose()
    }

    async fn list_route_permissions(&self) -> AppResult<Vec<RoutePermissionOverride>> {
        let rows = sqlx::query_as::<_, RoutePermissionRow>(
            r#"
            SELECT route_key, action, resource
            FROM route_permissions
            ORDER BY route_key
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::StoreUnavailable(format!("failed to list route permissions: {error}"))
        })?;

        rows.into_iter()
            .map(|row| {
                let grant = row.grant()?;
                Ok(RoutePermissionOverride {
                    route_key: row.route_key,
                    grant,
                })
            })
            .collect()
    }

    async fn save_route_permission(
        &self,
        route_key: &str,
        grant: &PermissionGrant,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO route_permissions (route_key, action, resource)
            VALUES ($1, $2, $3)
            ON CONFLICT (route_key) DO UPDATE
            SET action = EXCLUDED.action,
                resource = EXCLUDED.resource,
                updated_at = now()
            "#,
        )
        .bind(route_key)
        .bind(grant.action.as_str())
        .bind(grant.resource.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::StoreUnavailable(format!(
                "failed to save route permission '{route_key}': {error}"
            ))
        })?;

        Ok(())
    }
}
