//! SQLite persistence: pool setup, migrations, seed data.

pub mod departments;
pub mod menus;
pub mod models;
pub mod posts;
pub mod roles;
pub mod users;

use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Open the pool and bring the schema up to date.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .context("Invalid database URL")?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .context("Failed to open database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok(pool)
}

/// Seed the initial admin account unless it already exists.
pub async fn seed_admin(pool: &SqlitePool) -> Result<()> {
    if users::find_by_username(pool, "boss").await?.is_some() {
        tracing::info!("Admin user already exists");
        return Ok(());
    }

    let hash = crate::auth::password::hash_password("boss")?;
    let new_user = users::CreateUser {
        username: "boss".to_string(),
        nickname: Some("Administrator".to_string()),
        department_id: None,
        phone_number: None,
        email: None,
        is_admin: true,
        gender: None,
        remark: Some("initial admin account".to_string()),
    };
    users::create(pool, &new_user, &hash, None).await?;

    tracing::info!("Initial admin user created");
    Ok(())
}
