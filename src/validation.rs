use std::str::FromStr;

use crate::api::leave_request::CreateLeaveRequest;
use crate::error::ApiError;
use crate::model::leave_request::LeaveType;

type Strategy = fn(&CreateLeaveRequest) -> bool;

/// Parses the leave-type string case-insensitively and runs the matching
/// per-type validation. Unparseable strings and the unsupported `Other`
/// variant fail with `InvalidLeaveType` naming the offending value.
pub fn validate(draft: &CreateLeaveRequest) -> Result<bool, ApiError> {
    let leave_type = LeaveType::from_str(&draft.leave_type)
        .map_err(|_| ApiError::InvalidLeaveType(draft.leave_type.clone()))?;
    let strategy = strategy_for(leave_type)?;
    Ok(strategy(draft))
}

fn strategy_for(leave_type: LeaveType) -> Result<Strategy, ApiError> {
    match leave_type {
        LeaveType::Sick => Ok(validate_sick),
        LeaveType::Annual => Ok(validate_annual),
        LeaveType::Other => Err(ApiError::InvalidLeaveType(leave_type.to_string())),
    }
}

// Per-type rules are extension points; both accept everything for now.

fn validate_sick(_draft: &CreateLeaveRequest) -> bool {
    true
}

fn validate_annual(_draft: &CreateLeaveRequest) -> bool {
    true
}
