use std::str::FromStr;

use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

const CREATE_EMPLOYEES: &str = r#"
CREATE TABLE IF NOT EXISTS employees (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name    TEXT NOT NULL,
    department   TEXT NOT NULL,
    joining_date TEXT NOT NULL
)
"#;

const CREATE_LEAVE_REQUESTS: &str = r#"
CREATE TABLE IF NOT EXISTS leave_requests (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    employee_id INTEGER NOT NULL REFERENCES employees(id),
    leave_type  TEXT NOT NULL,
    start_date  TEXT NOT NULL,
    end_date    TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'Pending',
    reason      TEXT,
    created_at  TEXT NOT NULL
)
"#;

pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    Ok(pool)
}

pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_EMPLOYEES).execute(pool).await?;
    sqlx::query(CREATE_LEAVE_REQUESTS).execute(pool).await?;
    Ok(())
}

/// Fixture rows the service boots with: two employees and one pending annual
/// leave. `INSERT OR IGNORE` keeps restarts idempotent.
pub async fn seed(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO employees (id, full_name, department, joining_date)
        VALUES (1, 'Mayssa Ben Othmane', 'IT', '2025-04-15'),
               (2, 'Mohamed Youssef', 'IT', '2022-06-01')
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO leave_requests
            (id, employee_id, leave_type, start_date, end_date, status, reason, created_at)
        VALUES (1, 1, 'Annual', '2022-06-10', '2022-06-15', 'Pending', 'Summer vacation', ?)
        "#,
    )
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn init(database_url: &str) -> anyhow::Result<SqlitePool> {
    let pool = connect(database_url).await?;
    ensure_schema(&pool).await?;
    seed(&pool).await?;
    info!("Database ready");
    Ok(pool)
}

/// Single-connection in-memory database with schema and seed applied. One
/// connection only: each SQLite `:memory:` connection is its own database.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    ensure_schema(&pool).await.unwrap();
    seed(&pool).await.unwrap();
    pool
}
