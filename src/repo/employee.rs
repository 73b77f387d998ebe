use sqlx::SqlitePool;

pub async fn exists(pool: &SqlitePool, employee_id: i64) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}
