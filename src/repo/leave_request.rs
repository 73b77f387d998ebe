use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;
use utoipa::ToSchema;

use crate::model::leave_request::{LeaveRequest, LeaveType, Status, inclusive_days};

const COLUMNS: &str =
    "id, employee_id, leave_type, start_date, end_date, status, reason, created_at";

/// Columns clients may sort the filter endpoint by. Anything else falls back
/// to the default so client input never reaches the ORDER BY clause directly.
const SORTABLE: &[&str] = &[
    "id",
    "employee_id",
    "leave_type",
    "start_date",
    "end_date",
    "status",
    "reason",
    "created_at",
];

const DEFAULT_SORT: &str = "created_at";

fn sort_column(requested: &str) -> &'static str {
    SORTABLE
        .iter()
        .find(|c| c.eq_ignore_ascii_case(requested))
        .copied()
        .unwrap_or(DEFAULT_SORT)
}

/// Store-facing draft for an insert; the id is assigned by SQLite.
pub struct NewLeaveRequest {
    pub employee_id: i64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: Status,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct LeaveQuery {
    pub employee_id: Option<i64>,
    pub leave_type: Option<LeaveType>,
    pub status: Option<Status>,
    pub start_from: Option<NaiveDate>,
    pub end_to: Option<NaiveDate>,
    pub keyword: Option<String>,
    pub sort_by: String,
    pub sort_desc: bool,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct LeaveReportRow {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = "Mayssa Ben Othmane")]
    pub employee_name: String,
    #[schema(example = 3)]
    pub total_leaves: i64,
    #[schema(example = 2)]
    pub annual_leaves: i64,
    #[schema(example = 1)]
    pub sick_leaves: i64,
}

// Helper enum for typed SQLx binding
enum BindValue {
    I64(i64),
    Str(String),
    Date(NaiveDate),
}

pub async fn all(pool: &SqlitePool) -> Result<Vec<LeaveRequest>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM leave_requests ORDER BY id"
    ))
    .fetch_all(pool)
    .await
}

pub async fn by_id(pool: &SqlitePool, id: i64) -> Result<Option<LeaveRequest>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM leave_requests WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &SqlitePool, new: &NewLeaveRequest) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, leave_type, start_date, end_date, status, reason, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.employee_id)
    .bind(new.leave_type)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(new.status)
    .bind(new.reason.as_deref())
    .bind(new.created_at)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Full overwrite of the mutable fields; id and created_at stay as stored.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    employee_id: i64,
    leave_type: LeaveType,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: Status,
    reason: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET employee_id = ?, leave_type = ?, start_date = ?, end_date = ?, status = ?, reason = ?
        WHERE id = ?
        "#,
    )
    .bind(employee_id)
    .bind(leave_type)
    .bind(start_date)
    .bind(end_date)
    .bind(status)
    .bind(reason)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn set_status(pool: &SqlitePool, id: i64, status: Status) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE leave_requests SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM leave_requests WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Inclusive-range intersection against every request of the employee,
/// regardless of status. Note this check and the insert/update that follows it
/// are separate statements: two concurrent writers for the same employee can
/// both pass before either commits, same as the original system.
pub async fn overlapping_exists(
    pool: &SqlitePool,
    employee_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    exclude_id: Option<i64>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM leave_requests
            WHERE employee_id = ?
              AND start_date <= ?
              AND end_date >= ?
              AND id <> COALESCE(?, -1)
        )
        "#,
    )
    .bind(employee_id)
    .bind(end_date)
    .bind(start_date)
    .bind(exclude_id)
    .fetch_one(pool)
    .await
}

/// Total inclusive days of the employee's Annual requests whose start date
/// falls in `year`. Day arithmetic stays in chrono rather than SQL.
pub async fn annual_days_in_year(
    pool: &SqlitePool,
    employee_id: i64,
    year: i32,
    exclude_id: Option<i64>,
) -> Result<i64, sqlx::Error> {
    let rows: Vec<(NaiveDate, NaiveDate)> = sqlx::query_as(
        r#"
        SELECT start_date, end_date FROM leave_requests
        WHERE employee_id = ?
          AND leave_type = 'Annual'
          AND strftime('%Y', start_date) = ?
          AND id <> COALESCE(?, -1)
        "#,
    )
    .bind(employee_id)
    .bind(format!("{year:04}"))
    .bind(exclude_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|(start, end)| inclusive_days(*start, *end))
        .sum())
}

pub async fn filter(pool: &SqlitePool, query: &LeaveQuery) -> Result<Vec<LeaveRequest>, sqlx::Error> {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<BindValue> = Vec::new();

    if let Some(employee_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(BindValue::I64(employee_id));
    }
    if let Some(leave_type) = query.leave_type {
        where_sql.push_str(" AND leave_type = ?");
        args.push(BindValue::Str(leave_type.to_string()));
    }
    if let Some(status) = query.status {
        where_sql.push_str(" AND status = ?");
        args.push(BindValue::Str(status.to_string()));
    }
    if let Some(start_from) = query.start_from {
        where_sql.push_str(" AND start_date >= ?");
        args.push(BindValue::Date(start_from));
    }
    if let Some(end_to) = query.end_to {
        where_sql.push_str(" AND end_date <= ?");
        args.push(BindValue::Date(end_to));
    }
    if let Some(keyword) = query.keyword.as_deref() {
        where_sql.push_str(" AND reason LIKE ?");
        args.push(BindValue::Str(format!("%{keyword}%")));
    }

    let column = sort_column(&query.sort_by);
    let direction = if query.sort_desc { "DESC" } else { "ASC" };
    let offset = (query.page.max(1) - 1) as i64 * query.page_size as i64;

    let sql = format!(
        "SELECT {COLUMNS} FROM leave_requests{where_sql} ORDER BY {column} {direction} LIMIT ? OFFSET ?"
    );
    debug!(sql = %sql, "Filtering leave requests");

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&sql);
    for arg in args {
        data_q = match arg {
            BindValue::I64(v) => data_q.bind(v),
            BindValue::Str(s) => data_q.bind(s),
            BindValue::Date(d) => data_q.bind(d),
        };
    }

    data_q
        .bind(query.page_size as i64)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Per-employee leave counts for all requests starting in `year`, joined to
/// employees for the display name. The date range applies only when both
/// bounds are given.
pub async fn report(
    pool: &SqlitePool,
    year: i32,
    department: Option<&str>,
    date_range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<LeaveReportRow>, sqlx::Error> {
    let mut where_sql = String::from(" WHERE strftime('%Y', lr.start_date) = ?");
    let mut args: Vec<BindValue> = vec![BindValue::Str(format!("{year:04}"))];

    if let Some(department) = department {
        where_sql.push_str(" AND e.department = ?");
        args.push(BindValue::Str(department.to_string()));
    }
    if let Some((from, to)) = date_range {
        where_sql.push_str(" AND lr.start_date >= ? AND lr.end_date <= ?");
        args.push(BindValue::Date(from));
        args.push(BindValue::Date(to));
    }

    let sql = format!(
        r#"
        SELECT lr.employee_id,
               e.full_name AS employee_name,
               COUNT(*) AS total_leaves,
               SUM(CASE WHEN lr.leave_type = 'Annual' THEN 1 ELSE 0 END) AS annual_leaves,
               SUM(CASE WHEN lr.leave_type = 'Sick' THEN 1 ELSE 0 END) AS sick_leaves
        FROM leave_requests lr
        JOIN employees e ON e.id = lr.employee_id
        {where_sql}
        GROUP BY lr.employee_id, e.full_name
        ORDER BY lr.employee_id
        "#
    );
    debug!(sql = %sql, year, "Building leave report");

    let mut report_q = sqlx::query_as::<_, LeaveReportRow>(&sql);
    for arg in args {
        report_q = match arg {
            BindValue::I64(v) => report_q.bind(v),
            BindValue::Str(s) => report_q.bind(s),
            BindValue::Date(d) => report_q.bind(d),
        };
    }

    report_q.fetch_all(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_key_falls_back_to_created_at() {
        assert_eq!(sort_column("id"), "id");
        assert_eq!(sort_column("START_DATE"), "start_date");
        assert_eq!(sort_column("created_at; DROP TABLE leave_requests"), "created_at");
        assert_eq!(sort_column("CreatedAt"), "created_at");
    }
}
