use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Canonical variant names ("Annual", "Pending", ...) are what goes over the
/// wire and into the `leave_requests` table; parsing is case-insensitive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum LeaveType {
    Annual,
    Sick,
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum Status {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 1,
        "leave_type": "Annual",
        "start_date": "2022-06-10",
        "end_date": "2022-06-15",
        "status": "Pending",
        "reason": "Summer vacation",
        "created_at": "2022-06-01T00:00:00Z"
    })
)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 1)]
    pub employee_id: i64,

    #[schema(example = "Annual")]
    pub leave_type: LeaveType,

    #[schema(example = "2022-06-10", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2022-06-15", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    #[schema(example = "Pending")]
    pub status: Status,

    #[schema(example = "Summer vacation", nullable = true)]
    pub reason: Option<String>,

    #[schema(example = "2022-06-01T00:00:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Number of days covered by a leave, counting both endpoints.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}
