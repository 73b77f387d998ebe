use crate::api::leave_request::{
    ApprovalResult, CreateLeaveRequest, LeaveFilter, ReportQuery, UpdateLeaveRequest,
};
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveType, Status};
use crate::repo::leave_request::LeaveReportRow;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management API",
        version = "1.0.0",
        description = r#"
## Leave Management Service

Tracks employee leave requests with a simple approval workflow.

### Key Features
- **Leave Requests**
  - Create, update, list, and delete leave requests
  - Overlap detection and a 20-day annual quota per calendar year
  - Pending → Approved / Rejected workflow
- **Filtering**
  - Filter, sort, and paginate leave requests
- **Reporting**
  - Per-employee annual/sick leave counts for a given year

### Response Format
- JSON-based RESTful responses

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::list_all,
        crate::api::leave_request::get_one,
        crate::api::leave_request::create,
        crate::api::leave_request::update,
        crate::api::leave_request::delete,
        crate::api::leave_request::filter,
        crate::api::leave_request::report,
        crate::api::leave_request::approve,
        crate::api::leave_request::request
    ),
    components(
        schemas(
            LeaveRequest,
            LeaveType,
            Status,
            Employee,
            CreateLeaveRequest,
            UpdateLeaveRequest,
            LeaveFilter,
            ReportQuery,
            ApprovalResult,
            LeaveReportRow
        )
    ),
    tags(
        (name = "Leave", description = "Leave request management APIs"),
        (name = "Report", description = "Leave reporting APIs"),
    )
)]
pub struct ApiDoc;
