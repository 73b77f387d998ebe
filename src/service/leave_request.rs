use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::api::leave_request::{CreateLeaveRequest, LeaveFilter, ReportQuery, UpdateLeaveRequest};
use crate::error::ApiError;
use crate::model::leave_request::{LeaveRequest, LeaveType, Status, inclusive_days};
use crate::repo;
use crate::repo::leave_request::{LeaveQuery, LeaveReportRow, NewLeaveRequest};

/// Inclusive Annual days one employee may take per calendar year, keyed by the
/// request's start-date year.
const ANNUAL_QUOTA_DAYS: i64 = 20;

const DEFAULT_PAGE_SIZE: u32 = 10;

fn parse_leave_type(raw: &str) -> Result<LeaveType, ApiError> {
    LeaveType::from_str(raw).map_err(|_| ApiError::InvalidLeaveType(raw.to_string()))
}

fn is_blank(reason: Option<&str>) -> bool {
    reason.is_none_or(|r| r.trim().is_empty())
}

async fn ensure_annual_quota(
    pool: &SqlitePool,
    employee_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    exclude_id: Option<i64>,
) -> Result<(), ApiError> {
    let year = start_date.year();
    let taken = repo::leave_request::annual_days_in_year(pool, employee_id, year, exclude_id).await?;
    if taken + inclusive_days(start_date, end_date) > ANNUAL_QUOTA_DAYS {
        return Err(ApiError::AnnualQuotaExceeded);
    }
    Ok(())
}

/// Full validation pipeline, short-circuiting on the first failure: employee
/// existence, date sanity, leave-type parse, sick-reason requirement, overlap,
/// annual quota. Status is forced to Pending and created_at is set here
/// regardless of what the client sent.
pub async fn create(pool: &SqlitePool, dto: &CreateLeaveRequest) -> Result<LeaveRequest, ApiError> {
    if !repo::employee::exists(pool, dto.employee_id).await? {
        return Err(ApiError::UnknownEmployee);
    }
    if dto.end_date < dto.start_date {
        return Err(ApiError::InvalidDateRange);
    }
    let leave_type = parse_leave_type(&dto.leave_type)?;
    if leave_type == LeaveType::Sick && is_blank(dto.reason.as_deref()) {
        return Err(ApiError::MissingReason);
    }
    if repo::leave_request::overlapping_exists(pool, dto.employee_id, dto.start_date, dto.end_date, None)
        .await?
    {
        return Err(ApiError::OverlappingRequest);
    }
    if leave_type == LeaveType::Annual {
        ensure_annual_quota(pool, dto.employee_id, dto.start_date, dto.end_date, None).await?;
    }

    let new = NewLeaveRequest {
        employee_id: dto.employee_id,
        leave_type,
        start_date: dto.start_date,
        end_date: dto.end_date,
        status: Status::Pending,
        reason: dto.reason.clone(),
        created_at: Utc::now(),
    };
    let id = repo::leave_request::insert(pool, &new).await?;

    Ok(LeaveRequest {
        id,
        employee_id: new.employee_id,
        leave_type: new.leave_type,
        start_date: new.start_date,
        end_date: new.end_date,
        status: new.status,
        reason: new.reason,
        created_at: new.created_at,
    })
}

/// Overwrites every mutable field, status included, keeping id and created_at.
/// Overlap and quota checks exclude the record itself. Date sanity is not
/// re-checked on update.
pub async fn update(pool: &SqlitePool, id: i64, dto: &UpdateLeaveRequest) -> Result<(), ApiError> {
    if repo::leave_request::by_id(pool, id).await?.is_none() {
        return Err(ApiError::NotFound);
    }
    let leave_type = parse_leave_type(&dto.leave_type)?;
    if leave_type == LeaveType::Sick && is_blank(dto.reason.as_deref()) {
        return Err(ApiError::MissingReason);
    }
    if repo::leave_request::overlapping_exists(
        pool,
        dto.employee_id,
        dto.start_date,
        dto.end_date,
        Some(id),
    )
    .await?
    {
        return Err(ApiError::OverlappingRequest);
    }
    if leave_type == LeaveType::Annual {
        ensure_annual_quota(pool, dto.employee_id, dto.start_date, dto.end_date, Some(id)).await?;
    }

    repo::leave_request::update(
        pool,
        id,
        dto.employee_id,
        leave_type,
        dto.start_date,
        dto.end_date,
        dto.status,
        dto.reason.as_deref(),
    )
    .await?;
    Ok(())
}

/// Pending is the only state approve accepts.
pub async fn approve(pool: &SqlitePool, id: i64) -> Result<(i64, Status), ApiError> {
    let existing = repo::leave_request::by_id(pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    if existing.status != Status::Pending {
        return Err(ApiError::InvalidTransition);
    }
    repo::leave_request::set_status(pool, id, Status::Approved).await?;
    Ok((id, Status::Approved))
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<LeaveRequest, ApiError> {
    repo::leave_request::by_id(pool, id)
        .await?
        .ok_or(ApiError::NotFound)
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<LeaveRequest>, ApiError> {
    Ok(repo::leave_request::all(pool).await?)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), ApiError> {
    let affected = repo::leave_request::delete(pool, id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(())
}

/// Unparseable leave-type or status filter values are ignored rather than
/// rejected; they mean "no filter".
pub async fn filter(pool: &SqlitePool, f: &LeaveFilter) -> Result<Vec<LeaveRequest>, ApiError> {
    let query = LeaveQuery {
        employee_id: f.employee_id,
        leave_type: f
            .leave_type
            .as_deref()
            .and_then(|s| LeaveType::from_str(s).ok()),
        status: f.status.as_deref().and_then(|s| Status::from_str(s).ok()),
        start_from: f.start_date,
        end_to: f.end_date,
        keyword: f.keyword.clone().filter(|k| !k.trim().is_empty()),
        sort_by: f.sort_by.clone().unwrap_or_else(|| "created_at".to_string()),
        sort_desc: !f
            .sort_order
            .as_deref()
            .is_some_and(|o| o.eq_ignore_ascii_case("asc")),
        page: f.page.unwrap_or(1).max(1),
        page_size: f.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    };
    Ok(repo::leave_request::filter(pool, &query).await?)
}

pub async fn report(pool: &SqlitePool, q: &ReportQuery) -> Result<Vec<LeaveReportRow>, ApiError> {
    let date_range = match (q.start_date, q.end_date) {
        (Some(from), Some(to)) => Some((from, to)),
        _ => None,
    };
    Ok(repo::leave_request::report(pool, q.year, q.department.as_deref(), date_range).await?)
}

/// Insert path behind the strategy-dispatch endpoint; the per-type validation
/// has already run in the handler. Status and created_at are still server-set.
pub async fn submit(pool: &SqlitePool, dto: &CreateLeaveRequest) -> Result<i64, ApiError> {
    let leave_type = parse_leave_type(&dto.leave_type)?;
    let new = NewLeaveRequest {
        employee_id: dto.employee_id,
        leave_type,
        start_date: dto.start_date,
        end_date: dto.end_date,
        status: Status::Pending,
        reason: dto.reason.clone(),
        created_at: Utc::now(),
    };
    Ok(repo::leave_request::insert(pool, &new).await?)
}
