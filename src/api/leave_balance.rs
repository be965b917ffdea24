use crate::api::AppWorkflow;
use crate::auth::auth::AuthUser;
use crate::leave::accrual::{BalanceSummary, employee_summaries};
use crate::model::leave_balance::LeaveBalance;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignBalance {
    #[schema(value_type = String, example = "168")]
    pub total_hours: Decimal,
    /// Defaults to the current year
    #[schema(example = 2026)]
    pub year: Option<i32>,
    #[schema(example = "Carry-over approved by HR")]
    pub note: Option<String>,
}

/// Current-year balances of the caller, with accrual to date
#[utoipa::path(
    get,
    path = "/api/leave-balances",
    responses(
        (status = 200, description = "Balances with accrual", body = [BalanceSummary]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Balance"
)]
pub async fn my_balances(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
) -> actix_web::Result<impl Responder> {
    let today = Utc::now().date_naive();
    let rows = employee_summaries(workflow.store(), auth.tenant, auth.employee_id, today).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Current-year balances of an employee
#[utoipa::path(
    get,
    path = "/api/leave-balances/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Balances with accrual", body = [BalanceSummary]),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Balance"
)]
pub async fn employee_balances(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    if employee_id != auth.employee_id {
        auth.require_approver()?;
    }

    let today = Utc::now().date_naive();
    let rows = employee_summaries(workflow.store(), auth.tenant, employee_id, today).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Set an employee's entitlement for a leave type (creates the row if absent)
#[utoipa::path(
    put,
    path = "/api/leave-balances/employee/{employee_id}/{leave_type_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID"),
        ("leave_type_id" = u64, Path, description = "Leave type ID")
    ),
    request_body = AssignBalance,
    responses(
        (status = 200, description = "Balance updated", body = LeaveBalance),
        (status = 400, description = "Negative total"),
        (status = 403, description = "HR/Admin only"),
        (status = 404, description = "Employee or leave type not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Balance"
)]
pub async fn assign_balance(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
    path: web::Path<(u64, u64)>,
    payload: web::Json<AssignBalance>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;

    let (employee_id, leave_type_id) = path.into_inner();
    let AssignBalance {
        total_hours,
        year,
        note,
    } = payload.into_inner();
    let now = Utc::now();

    let balance = workflow
        .ledger()
        .assign(
            auth.tenant,
            employee_id,
            leave_type_id,
            year.unwrap_or_else(|| now.year()),
            total_hours,
            note,
            now,
        )
        .await?;

    Ok(HttpResponse::Ok().json(balance))
}
