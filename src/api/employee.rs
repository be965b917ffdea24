use crate::{
    api::AppWorkflow,
    auth::auth::AuthUser,
    error::LeaveError,
    model::employee::{Employee, Gender},
    model::leave_balance::check_hours,
    model::role::Role,
    store::LeaveStore,
    utils::db_utils::{SqlValue, build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

/// Columns HR may change through `PUT /employees/{id}`.
const UPDATABLE_COLUMNS: &[&str] = &[
    "first_name",
    "last_name",
    "manager_id",
    "daily_working_hours",
    "country_code",
    "working_days",
    "is_active",
];

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "john@email.com", format = "email")]
    pub email: String,
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = 0)]
    pub role_id: u8,
    pub gender: Gender,
    #[schema(example = 7)]
    pub manager_id: Option<u64>,
    #[schema(value_type = Option<String>, example = "8")]
    pub daily_working_hours: Option<Decimal>,
    #[schema(example = "AE")]
    pub country_code: Option<String>,
    /// Weekly bitmask, Mon=1 … Sun=64
    #[schema(example = 31)]
    pub working_days: Option<u8>,
}

impl CreateEmployee {
    fn validate(&self) -> Result<(), LeaveError> {
        if !self.email.contains('@') {
            return Err(LeaveError::validation("A valid email is required"));
        }
        if Role::from_id(self.role_id).is_none() {
            return Err(LeaveError::Validation(format!(
                "Unknown role id {}",
                self.role_id
            )));
        }
        validate_schedule(self.daily_working_hours, self.working_days)
    }
}

fn validate_schedule(daily_hours: Option<Decimal>, mask: Option<u8>) -> Result<(), LeaveError> {
    if let Some(hours) = daily_hours {
        if hours <= Decimal::ZERO || hours > Decimal::from(24) {
            return Err(LeaveError::validation(
                "daily_working_hours must be between 0 and 24",
            ));
        }
        check_hours("daily_working_hours", hours)?;
    }
    if let Some(mask) = mask {
        if mask > 0b111_1111 {
            return Err(LeaveError::validation(
                "working_days must be a 7-bit mask (Mon=1 ... Sun=64)",
            ));
        }
    }
    Ok(())
}

/// Checks the typed fields of a partial update body.
fn validate_update(body: &Value) -> Result<(), LeaveError> {
    let daily = match body.get("daily_working_hours") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            serde_json::from_value::<Decimal>(v.clone())
                .map_err(|_| LeaveError::validation("daily_working_hours must be a number"))?,
        ),
    };
    let mask = match body.get("working_days") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            v.as_u64()
                .and_then(|m| u8::try_from(m).ok())
                .ok_or_else(|| LeaveError::validation("working_days must be a 7-bit mask"))?,
        ),
    };
    validate_schedule(daily, mask)
}

#[derive(Serialize, ToSchema)]
pub struct CreatedEmployee {
    pub employee: Employee,
    /// Leave types for which a balance row was opened
    pub provisioned_leave_types: Vec<u64>,
}

/// Create an employee and open this year's leave balances
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = CreatedEmployee),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "HR/Admin only")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    workflow: web::Data<AppWorkflow>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;
    payload.validate()?;

    let country_code = payload
        .country_code
        .as_deref()
        .map(|c| c.trim().to_uppercase());

    let result = sqlx::query(
        r#"
        INSERT INTO employees
            (tenant_id, email, first_name, last_name, role_id, gender, manager_id,
             daily_working_hours, country_code, working_days, is_active)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, TRUE)
        "#,
    )
    .bind(auth.tenant)
    .bind(payload.email.trim())
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(payload.role_id)
    .bind(payload.gender)
    .bind(payload.manager_id)
    .bind(payload.daily_working_hours)
    .bind(&country_code)
    .bind(payload.working_days)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create employee");
        LeaveError::from(e)
    })?;

    let employee = workflow
        .store()
        .employee(auth.tenant, result.last_insert_id())
        .await?
        .ok_or_else(|| LeaveError::not_found("Employee"))?;

    let created = workflow
        .ledger()
        .provision(auth.tenant, &employee, Utc::now().year())
        .await?;

    info!(
        tenant = %auth.tenant,
        employee_id = employee.id,
        balances = created.len(),
        "Employee onboarded"
    );

    Ok(HttpResponse::Created().json(CreatedEmployee {
        employee,
        provisioned_leave_types: created.iter().map(|b| b.leave_type_id).collect(),
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_employee(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    if employee_id != auth.employee_id {
        auth.require_approver()?;
    }

    let employee = workflow
        .store()
        .employee(auth.tenant, employee_id)
        .await?
        .ok_or_else(|| LeaveError::not_found("Employee"))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Update an employee's profile or working pattern (partial)
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    request_body(
        content = Object,
        description = "Any of: first_name, last_name, manager_id, daily_working_hours, country_code, working_days, is_active",
        example = json!({ "daily_working_hours": "7.5", "working_days": 31 })
    ),
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "HR/Admin only"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    workflow: web::Data<AppWorkflow>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;
    let employee_id = path.into_inner();

    validate_update(&body)?;
    let update = build_update_sql(
        "employees",
        &body,
        UPDATABLE_COLUMNS,
        auth.tenant,
        "id",
        SqlValue::U64(employee_id),
    )?;

    execute_update(pool.get_ref(), update)
        .await
        .map_err(LeaveError::from)?;

    let employee = workflow
        .store()
        .employee(auth.tenant, employee_id)
        .await?
        .ok_or_else(|| LeaveError::not_found("Employee"))?;

    info!(tenant = %auth.tenant, employee_id, "Employee updated");
    Ok(HttpResponse::Ok().json(employee))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> CreateEmployee {
        serde_json::from_value(json!({
            "email": "jane@company.com",
            "first_name": "Jane",
            "last_name": "Doe",
            "role_id": 0,
            "gender": "female"
        }))
        .unwrap()
    }

    #[test]
    fn minimal_payload_is_valid() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn schedule_overrides_are_checked() {
        let mut p = payload();
        p.working_days = Some(0b1001_1111);
        assert!(p.validate().is_err());

        let mut p = payload();
        p.daily_working_hours = Some(Decimal::ZERO);
        assert!(p.validate().is_err());

        let mut p = payload();
        p.role_id = 9;
        assert!(p.validate().is_err());
    }

    #[test]
    fn partial_update_values_are_validated() {
        assert!(validate_update(&json!({ "daily_working_hours": "7.5" })).is_ok());
        assert!(validate_update(&json!({ "daily_working_hours": null })).is_ok());
        assert!(validate_update(&json!({ "working_days": 300 })).is_err());
        assert!(validate_update(&json!({ "daily_working_hours": "-1" })).is_err());
        assert!(validate_update(&json!({ "daily_working_hours": "7.125" })).is_err());
    }
}
