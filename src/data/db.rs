use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

/// Opens the SQLite pool and verifies the connection is usable.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    info!(url = %database_url, "Connecting to database");

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("failed to connect to database")?;

    sqlx::query("SELECT 1")
        .fetch_one(&pool)
        .await
        .context("database connection test failed")?;

    info!("Database connection verified");
    Ok(pool)
}

/// Creates the schema when missing. `username` carries a store-layer UNIQUE
/// constraint so a registration race cannot produce a second row; doctor and
/// user deletion deliberately do not cascade, matching the listing semantics
/// (orphaned links render as a missing doctor name via LEFT JOIN).
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    info!("Initializing database schema");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            role TEXT NOT NULL,
            specialty TEXT
        )",
    )
    .execute(pool)
    .await
    .context("failed to create users table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS doctors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            specialty TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("failed to create doctors table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS patients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            gender TEXT NOT NULL,
            address TEXT NOT NULL,
            doctor_id INTEGER
        )",
    )
    .execute(pool)
    .await
    .context("failed to create patients table")?;

    info!("Database schema ready");
    Ok(())
}

#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    // A single connection keeps every test query on the same in-memory db.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    init_schema(&pool).await.expect("schema");
    pool
}
