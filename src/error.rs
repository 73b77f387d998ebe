use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::{Display, Error};
use serde_json::json;
use tracing::error;

/// Everything a leave-request operation can fail with. Validation variants map
/// to 400 with their message in the body; `NotFound` to 404; `Storage` to a
/// generic 500 (the sqlx detail is logged, never returned to the client).
#[derive(Debug, Display, Error)]
pub enum ApiError {
    #[display(fmt = "Leave request not found.")]
    NotFound,

    #[display(fmt = "Invalid EmployeeId. Employee does not exist.")]
    UnknownEmployee,

    #[display(fmt = "End date cannot be earlier than start date.")]
    InvalidDateRange,

    #[display(fmt = "Sick leave must include a reason.")]
    MissingReason,

    #[display(fmt = "Leave request overlaps with existing request.")]
    OverlappingRequest,

    #[display(fmt = "Exceeded annual leave limit (20 days).")]
    AnnualQuotaExceeded,

    #[display(fmt = "Invalid leave type: {}. It must be either 'Sick' or 'Annual'.", _0)]
    InvalidLeaveType(#[error(not(source))] String),

    #[display(fmt = "Only pending requests can be approved.")]
    InvalidTransition,

    #[display(fmt = "An error occurred while saving the leave request.")]
    Storage(sqlx::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Storage(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Storage(e) = self {
            error!(error = %e, "Storage failure");
        }
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}
