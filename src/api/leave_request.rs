use crate::api::AppWorkflow;
use crate::auth::auth::AuthUser;
use crate::error::LeaveError;
use crate::leave::workflow::{CreateLeave, Decision};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::role::Role;
use crate::store::LeaveStore;
use crate::store::mysql::LEAVE_REQUEST_COLUMNS;
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 123)]
    /// Filter by employee ID (HR and approvers only)
    pub employee_id: Option<u64>,
    /// Filter by leave status
    pub status: Option<LeaveStatus>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>, // 1-based
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Status(LeaveStatus),
}

/// WHERE clause limiting rows to what the caller may see: own requests for
/// employees, own plus direct reports for approvers, everything for HR.
fn visibility(auth: &AuthUser) -> (String, Vec<FilterValue>) {
    let mut where_sql = String::from(" WHERE tenant_id = ?");
    let mut args = vec![FilterValue::U64(auth.tenant.get())];

    match auth.role {
        Role::Employee => {
            where_sql.push_str(" AND employee_id = ?");
            args.push(FilterValue::U64(auth.employee_id));
        }
        Role::Approver => {
            where_sql.push_str(
                " AND (employee_id = ? OR employee_id IN \
                 (SELECT id FROM employees WHERE tenant_id = ? AND manager_id = ?))",
            );
            args.push(FilterValue::U64(auth.employee_id));
            args.push(FilterValue::U64(auth.tenant.get()));
            args.push(FilterValue::U64(auth.employee_id));
        }
        Role::HrAdmin | Role::SuperAdmin => {}
    }
    (where_sql, args)
}

async fn fetch_page(
    pool: &MySqlPool,
    where_sql: &str,
    args: &[FilterValue],
    order: &str,
    page: u64,
    per_page: u64,
) -> Result<(Vec<LeaveRequest>, i64), LeaveError> {
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Status(s) => count_q.bind(*s),
        };
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {LEAVE_REQUEST_COLUMNS} FROM leave_requests{where_sql} ORDER BY {order} LIMIT ? OFFSET ?"
    );
    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(*v),
            FilterValue::Status(s) => data_q.bind(*s),
        };
    }
    let rows = data_q
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(pool)
        .await?;

    Ok((rows, total))
}

/// List leave requests visible to the caller
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);

    let (mut where_sql, mut args) = visibility(&auth);
    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }
    if let Some(status) = query.status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Status(status));
    }

    let (data, total) = fetch_page(
        pool.get_ref(),
        &where_sql,
        &args,
        "created_at DESC",
        page,
        per_page,
    )
    .await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/// Pending requests awaiting a decision, oldest first
#[utoipa::path(
    get,
    path = "/api/leave/pending",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Pending requests", body = LeaveListResponse),
        (status = 403, description = "Approver, HR or Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn pending_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;

    let per_page = query.per_page.unwrap_or(50).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);

    let mut where_sql = String::from(" WHERE tenant_id = ? AND status = ?");
    let mut args = vec![
        FilterValue::U64(auth.tenant.get()),
        FilterValue::Status(LeaveStatus::Pending),
    ];
    if auth.role == Role::Approver {
        where_sql.push_str(
            " AND employee_id IN (SELECT id FROM employees WHERE tenant_id = ? AND manager_id = ?)",
        );
        args.push(FilterValue::U64(auth.tenant.get()));
        args.push(FilterValue::U64(auth.employee_id));
    }

    let (data, total) = fetch_page(
        pool.get_ref(),
        &where_sql,
        &args,
        "created_at ASC",
        page,
        per_page,
    )
    .await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/// Get a single leave request
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    let request = workflow
        .store()
        .leave_request(auth.tenant, leave_id)
        .await?
        .ok_or_else(|| LeaveError::not_found("Leave request"))?;

    if request.employee_id != auth.employee_id {
        auth.require_approver()?;
    }

    Ok(HttpResponse::Ok().json(request))
}

/// Submit a leave request for the calling employee
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request created", body = LeaveRequest),
        (status = 400, description = "Validation failed or insufficient balance"),
        (status = 404, description = "No balance for this leave type and year"),
        (status = 503, description = "Public holidays unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let request = workflow
        .create(auth.tenant, auth.employee_id, payload.into_inner(), Utc::now())
        .await?;

    Ok(HttpResponse::Created().json(request))
}

/// Approve or reject a pending request
#[utoipa::path(
    post,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to decide")
    ),
    request_body = Decision,
    responses(
        (status = 200, description = "Decision recorded", body = LeaveRequest),
        (status = 400, description = "Request is not pending"),
        (status = 403, description = "Approver, HR or Admin only"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn decide_leave(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
    path: web::Path<u64>,
    payload: web::Json<Decision>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;

    let request = workflow
        .decide(
            auth.tenant,
            path.into_inner(),
            auth.employee_id,
            payload.into_inner(),
            Utc::now(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(request))
}

/// Cancel one of the caller's own requests
#[utoipa::path(
    delete,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to cancel")
    ),
    responses(
        (status = 204, description = "Leave request cancelled"),
        (status = 400, description = "Already processed or already started"),
        (status = 403, description = "Not the requester"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let now = Utc::now();
    workflow
        .cancel(
            auth.tenant,
            path.into_inner(),
            auth.employee_id,
            now.date_naive(),
            now,
        )
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
