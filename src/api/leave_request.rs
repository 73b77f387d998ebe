use std::str::FromStr;

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::model::leave_request::Status;
use crate::service;
use crate::validation;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLeaveRequest {
    #[schema(example = 1)]
    pub employee_id: i64,
    /// Parsed case-insensitively; one of Annual, Sick, Other
    #[schema(example = "Annual")]
    pub leave_type: String,
    #[schema(example = "2024-03-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-03-05", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    /// Required (non-blank) when leave_type is Sick
    #[schema(example = "Family trip", nullable = true)]
    pub reason: Option<String>,
}

fn status_ci<'de, D>(deserializer: D) -> Result<Status, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Status::from_str(&raw).map_err(|_| serde::de::Error::custom(format!("invalid status: {raw}")))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLeaveRequest {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = "Annual")]
    pub leave_type: String,
    #[schema(example = "2024-03-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-03-05", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    /// Overwrites the stored status; parsed case-insensitively
    #[schema(example = "Pending", value_type = String)]
    #[serde(deserialize_with = "status_ci")]
    pub status: Status,
    #[schema(example = "Family trip", nullable = true)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by employee ID
    #[param(example = 1)]
    pub employee_id: Option<i64>,
    /// Filter by leave type; unrecognised values are ignored
    #[param(example = "Annual")]
    pub leave_type: Option<String>,
    /// Filter by status; unrecognised values are ignored
    #[param(example = "Pending")]
    pub status: Option<String>,
    /// Lower bound on start_date
    #[param(example = "2024-01-01", value_type = String)]
    pub start_date: Option<NaiveDate>,
    /// Upper bound on end_date
    #[param(example = "2024-12-31", value_type = String)]
    pub end_date: Option<NaiveDate>,
    /// Substring match on reason
    #[param(example = "vacation")]
    pub keyword: Option<String>,
    /// Sort column; unknown names fall back to created_at
    #[param(example = "created_at")]
    pub sort_by: Option<String>,
    /// "asc" or "desc" (default desc)
    #[param(example = "desc")]
    pub sort_order: Option<String>,
    /// Pagination page number (1-based, default 1)
    #[param(example = 1)]
    pub page: Option<u32>,
    /// Items per page (default 10)
    #[param(example = 10)]
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ReportQuery {
    /// Calendar year the requests start in
    #[param(example = 2024)]
    pub year: i32,
    /// Restrict to one department
    #[param(example = "IT")]
    pub department: Option<String>,
    /// Applied only when both bounds are present
    #[param(example = "2024-01-01", value_type = String)]
    pub start_date: Option<NaiveDate>,
    #[param(example = "2024-12-31", value_type = String)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApprovalResult {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Approved")]
    pub status: Status,
}

/* =========================
List all leave requests
========================= */
#[utoipa::path(
    get,
    path = "/api/leave-requests",
    responses(
        (status = 200, description = "All leave requests", body = [crate::model::leave_request::LeaveRequest])
    ),
    tag = "Leave"
)]
pub async fn list_all(pool: web::Data<SqlitePool>) -> Result<HttpResponse, ApiError> {
    let items = service::leave_request::list(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(items))
}

/* =========================
Fetch one leave request
========================= */
#[utoipa::path(
    get,
    path = "/api/leave-requests/{id}",
    params(("id" = i64, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave request found", body = crate::model::leave_request::LeaveRequest),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found."
        }))
    ),
    tag = "Leave"
)]
pub async fn get_one(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let item = service::leave_request::get(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

/* =========================
Create leave request (full validation)
========================= */
#[utoipa::path(
    post,
    path = "/api/leave-requests/create",
    request_body = CreateLeaveRequest,
    responses(
        (status = 201, description = "Leave request created", body = crate::model::leave_request::LeaveRequest),
        (status = 400, description = "Validation failure", body = Object, example = json!({
            "message": "Leave request overlaps with existing request."
        })),
        (status = 500, description = "Storage failure")
    ),
    tag = "Leave"
)]
pub async fn create(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateLeaveRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let created = service::leave_request::create(pool.get_ref(), &payload).await?;
    let location = format!("{}/{}", req.path().trim_end_matches("/create"), created.id);
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location))
        .json(created))
}

/* =========================
Update leave request
========================= */
#[utoipa::path(
    put,
    path = "/api/leave-requests/{id}",
    params(("id" = i64, Path, description = "Leave request ID")),
    request_body = UpdateLeaveRequest,
    responses(
        (status = 204, description = "Leave request updated"),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn update(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<UpdateLeaveRequest>,
) -> Result<HttpResponse, ApiError> {
    service::leave_request::update(pool.get_ref(), path.into_inner(), &payload).await?;
    Ok(HttpResponse::NoContent().finish())
}

/* =========================
Delete leave request
========================= */
#[utoipa::path(
    delete,
    path = "/api/leave-requests/{id}",
    params(("id" = i64, Path, description = "Leave request ID")),
    responses(
        (status = 204, description = "Leave request deleted"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn delete(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    service::leave_request::delete(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/* =========================
Filtered, sorted, paginated list
========================= */
#[utoipa::path(
    get,
    path = "/api/leave-requests/filter",
    params(LeaveFilter),
    responses(
        (status = 200, description = "One page of matching requests", body = [crate::model::leave_request::LeaveRequest])
    ),
    tag = "Leave"
)]
pub async fn filter(
    pool: web::Data<SqlitePool>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, ApiError> {
    let items = service::leave_request::filter(pool.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(items))
}

/* =========================
Per-employee aggregate report
========================= */
#[utoipa::path(
    get,
    path = "/api/leave-requests/report",
    params(ReportQuery),
    responses(
        (status = 200, description = "Per-employee leave counts", body = [crate::repo::leave_request::LeaveReportRow])
    ),
    tag = "Report"
)]
pub async fn report(
    pool: web::Data<SqlitePool>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, ApiError> {
    let rows = service::leave_request::report(pool.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/* =========================
Approve leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave-requests/{id}/approve",
    params(("id" = i64, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave request approved", body = ApprovalResult),
        (status = 400, description = "Request is not pending", body = Object, example = json!({
            "message": "Only pending requests can be approved."
        })),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn approve(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let (id, status) = service::leave_request::approve(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApprovalResult { id, status }))
}

/* =========================
Create via strategy-dispatch validation
========================= */
#[utoipa::path(
    post,
    path = "/api/leave-requests/request",
    request_body = CreateLeaveRequest,
    responses(
        (status = 200, description = "Leave request created", body = Object, example = json!({
            "message": "Leave request created."
        })),
        (status = 400, description = "Invalid leave type or failed validation")
    ),
    tag = "Leave"
)]
pub async fn request(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateLeaveRequest>,
) -> Result<HttpResponse, ApiError> {
    if !validation::validate(&payload)? {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": "Invalid leave request." })));
    }
    service::leave_request::submit(pool.get_ref(), &payload).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Leave request created." })))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use serde_json::{Value, json};

    use crate::config::Config;
    use crate::{db, routes};

    fn test_config() -> Config {
        Config {
            server_addr: "127.0.0.1:0".to_string(),
            database_url: "sqlite::memory:".to_string(),
            api_prefix: "/api".to_string(),
        }
    }

    macro_rules! test_app {
        ($pool:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($pool.clone()))
                    .configure(|cfg| routes::configure(cfg, test_config())),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn create_returns_201_with_location() {
        let pool = db::test_pool().await;
        let app = test_app!(pool);

        let req = test::TestRequest::post()
            .uri("/api/leave-requests/create")
            .set_json(json!({
                "employee_id": 2,
                "leave_type": "annual",
                "start_date": "2024-03-01",
                "end_date": "2024-03-05"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let location = resp.headers().get("location").unwrap().to_str().unwrap().to_string();

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "Pending");
        assert_eq!(body["leave_type"], "Annual");
        assert_eq!(location, format!("/api/leave-requests/{}", body["id"]));
    }

    #[actix_web::test]
    async fn create_validation_failures_are_400() {
        let pool = db::test_pool().await;
        let app = test_app!(pool);

        // inverted dates
        let req = test::TestRequest::post()
            .uri("/api/leave-requests/create")
            .set_json(json!({
                "employee_id": 1,
                "leave_type": "Annual",
                "start_date": "2024-03-05",
                "end_date": "2024-03-01"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "End date cannot be earlier than start date.");

        // unknown leave type fails fast
        let req = test::TestRequest::post()
            .uri("/api/leave-requests/create")
            .set_json(json!({
                "employee_id": 1,
                "leave_type": "holiday",
                "start_date": "2024-03-01",
                "end_date": "2024-03-05"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].as_str().unwrap().contains("holiday"));
    }

    #[actix_web::test]
    async fn get_unknown_id_is_404() {
        let pool = db::test_pool().await;
        let app = test_app!(pool);

        let req = test::TestRequest::get().uri("/api/leave-requests/999").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn update_returns_204_and_overwrites() {
        let pool = db::test_pool().await;
        let app = test_app!(pool);

        // the seeded pending request
        let req = test::TestRequest::put()
            .uri("/api/leave-requests/1")
            .set_json(json!({
                "employee_id": 1,
                "leave_type": "Other",
                "start_date": "2022-06-10",
                "end_date": "2022-06-15",
                "status": "rejected",
                "reason": "Changed plans"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri("/api/leave-requests/1").to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["status"], "Rejected");
        assert_eq!(body["leave_type"], "Other");
    }

    #[actix_web::test]
    async fn delete_then_get_is_404() {
        let pool = db::test_pool().await;
        let app = test_app!(pool);

        let req = test::TestRequest::delete().uri("/api/leave-requests/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri("/api/leave-requests/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn approve_is_single_shot() {
        let pool = db::test_pool().await;
        let app = test_app!(pool);

        let req = test::TestRequest::post().uri("/api/leave-requests/1/approve").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["status"], "Approved");

        let req = test::TestRequest::post().uri("/api/leave-requests/1/approve").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Only pending requests can be approved.");
    }

    #[actix_web::test]
    async fn filter_survives_hostile_sort_key() {
        let pool = db::test_pool().await;
        let app = test_app!(pool);

        let req = test::TestRequest::get()
            .uri("/api/leave-requests/filter?sort_by=id%3B%20DROP%20TABLE%20leave_requests&employee_id=1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        // table still there
        let req = test::TestRequest::get().uri("/api/leave-requests").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn report_returns_grouped_rows() {
        let pool = db::test_pool().await;
        let app = test_app!(pool);

        let req = test::TestRequest::get()
            .uri("/api/leave-requests/report?year=2022&department=IT")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["employee_name"], "Mayssa Ben Othmane");
        assert_eq!(rows[0]["total_leaves"], 1);
        assert_eq!(rows[0]["annual_leaves"], 1);
    }

    #[actix_web::test]
    async fn request_endpoint_dispatches_strategy_validation() {
        let pool = db::test_pool().await;
        let app = test_app!(pool);

        let req = test::TestRequest::post()
            .uri("/api/leave-requests/request")
            .set_json(json!({
                "employee_id": 2,
                "leave_type": "sick",
                "start_date": "2024-04-01",
                "end_date": "2024-04-02",
                "reason": "Flu"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Leave request created.");

        // "Other" is not backed by a strategy
        let req = test::TestRequest::post()
            .uri("/api/leave-requests/request")
            .set_json(json!({
                "employee_id": 2,
                "leave_type": "Other",
                "start_date": "2024-05-01",
                "end_date": "2024-05-02"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
