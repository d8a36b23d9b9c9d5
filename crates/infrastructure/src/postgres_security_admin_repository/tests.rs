use std::time::{SystemTime, UNIX_EPOCH};

use rentops_application::{AuthorizationRepository, SecurityAdminRepository};
use rentops_core::{AppError, UserId};
use rentops_domain::{Action, PermissionGrant, Resource};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresSecurityAdminRepository;
use crate::PostgresAuthorizationRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres security admin tests: {error}");
    }

    Some(pool)
}

fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos())
        .unwrap_or_default()
}

async fn insert_user(pool: &PgPool, email: &str) -> UserId {
    let inserted = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (email, name, is_active)
        VALUES ($1, $1, true)
        RETURNING id
        "#,
    )
    .bind(email)
    .fetch_one(pool)
    .await;

    match inserted {
        Ok(id) => UserId::new(id),
        Err(error) => panic!("failed to insert test user: {error}"),
    }
}

#[tokio::test]
async fn grants_are_idempotent_and_visible_to_resolution() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresSecurityAdminRepository::new(pool.clone());
    let authorization = PostgresAuthorizationRepository::new(pool.clone());
    let suffix = unique_suffix();
    let role_name = format!("dispatcher_{suffix}");
    let user_id = insert_user(&pool, &format!("dispatcher_{suffix}@example.com")).await;

    let Ok(role) = repository.create_role_with_permissions(&role_name, &[]).await else {
        panic!("role should be created");
    };
    let name = PermissionGrant::new(Action::Read, Resource::RENTAL).permission_name();
    let Ok(permission) = repository.upsert_permission(&name).await else {
        panic!("permission should be upserted");
    };

    assert!(matches!(
        repository.insert_role_permission(role.id, permission.id).await,
        Ok(true)
    ));
    assert!(matches!(
        repository.insert_role_permission(role.id, permission.id).await,
        Ok(false)
    ));
    assert!(repository.assign_role_to_user(user_id, role.id).await.is_ok());

    let Ok(roles) = authorization.list_roles_for_user(user_id).await else {
        panic!("roles should load");
    };
    assert_eq!(roles, vec![role.clone()]);

    let Ok(names) = authorization
        .list_permission_names_for_roles(&[role.id])
        .await
    else {
        panic!("permissions should load");
    };
    assert_eq!(names, vec!["read.Rental".to_owned()]);

    assert!(matches!(
        repository.delete_role_permission(role.id, permission.id).await,
        Ok(true)
    ));
    assert!(matches!(
        repository.delete_role_permission(role.id, permission.id).await,
        Ok(false)
    ));
}

#[tokio::test]
async fn duplicate_role_names_conflict() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresSecurityAdminRepository::new(pool);
    let role_name = format!("auditor_{}", unique_suffix());

    let approve = PermissionGrant::new(Action::Approve, Resource::RENTAL).permission_name();

    assert!(
        repository
            .create_role_with_permissions(&role_name, &[approve.clone()])
            .await
            .is_ok()
    );
    assert!(matches!(
        repository
            .create_role_with_permissions(&role_name, &[approve])
            .await,
        Err(AppError::Conflict(_))
    ));
    assert!(repository.ensure_role(&role_name).await.is_ok());

    let Ok(roles) = repository.list_roles().await else {
        panic!("roles should load");
    };
    let Some(created) = roles.iter().find(|role| role.name == role_name) else {
        panic!("role should be listed");
    };
    assert_eq!(created.permissions, vec!["approve.Rental".to_owned()]);
}

#[tokio::test]
async fn status_updates_require_an_existing_user() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresSecurityAdminRepository::new(pool);

    assert!(matches!(
        repository.set_user_active(UserId::new(-1), false).await,
        Err(AppError::NotFound(_))
    ));
}
