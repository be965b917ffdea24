use crate::api::AppWorkflow;
use crate::auth::auth::AuthUser;
use crate::error::LeaveError;
use crate::model::leave_balance::check_hours;
use crate::model::leave_type::{ApplicableGender, LeaveType};
use crate::store::LeaveStore;
use crate::store::mysql::LEAVE_TYPE_COLUMNS;
use actix_web::{HttpResponse, Responder, web};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertLeaveType {
    #[schema(example = "Annual")]
    pub name: String,
    pub description: Option<String>,
    /// Entitlement for an 8-hour working day
    #[schema(value_type = String, example = "168")]
    pub default_hours_per_year: Decimal,
    #[serde(default = "yes")]
    pub requires_approval: bool,
    #[serde(default)]
    pub requires_document: bool,
    #[serde(default = "all_genders")]
    pub applicable_gender: ApplicableGender,
    #[schema(example = "#3B82F6")]
    pub color_code: Option<String>,
}

fn yes() -> bool {
    true
}

fn all_genders() -> ApplicableGender {
    ApplicableGender::All
}

impl UpsertLeaveType {
    fn validate(&self) -> Result<(), LeaveError> {
        if self.name.trim().is_empty() {
            return Err(LeaveError::validation("Name is required"));
        }
        if self.default_hours_per_year < Decimal::ZERO {
            return Err(LeaveError::validation(
                "default_hours_per_year cannot be negative",
            ));
        }
        check_hours("default_hours_per_year", self.default_hours_per_year)
    }

    fn color(&self) -> &str {
        self.color_code.as_deref().unwrap_or("#3B82F6")
    }
}

/// Active leave types the caller is eligible for
#[utoipa::path(
    get,
    path = "/api/leave-types",
    responses(
        (status = 200, description = "Leave types", body = [LeaveType]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Type"
)]
pub async fn list_leave_types(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
) -> actix_web::Result<impl Responder> {
    let store = workflow.store();
    let employee = store
        .employee(auth.tenant, auth.employee_id)
        .await?
        .ok_or_else(|| LeaveError::not_found("Employee"))?;

    let types: Vec<LeaveType> = store
        .active_leave_types(auth.tenant)
        .await?
        .into_iter()
        .filter(|t| t.available_to(&employee))
        .collect();

    Ok(HttpResponse::Ok().json(types))
}

async fn fetch(pool: &MySqlPool, auth: &AuthUser, id: u64) -> Result<LeaveType, LeaveError> {
    let sql = format!("SELECT {LEAVE_TYPE_COLUMNS} FROM leave_types WHERE tenant_id = ? AND id = ?");
    sqlx::query_as::<_, LeaveType>(&sql)
        .bind(auth.tenant)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| LeaveError::not_found("Leave type"))
}

/// Create a leave type
#[utoipa::path(
    post,
    path = "/api/leave-types",
    request_body = UpsertLeaveType,
    responses(
        (status = 201, description = "Leave type created", body = LeaveType),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Type"
)]
pub async fn create_leave_type(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpsertLeaveType>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;
    payload.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO leave_types
            (tenant_id, name, description, default_hours_per_year, requires_approval,
             requires_document, applicable_gender, color_code, is_active)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, TRUE)
        "#,
    )
    .bind(auth.tenant)
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(payload.default_hours_per_year)
    .bind(payload.requires_approval)
    .bind(payload.requires_document)
    .bind(payload.applicable_gender)
    .bind(payload.color())
    .execute(pool.get_ref())
    .await
    .map_err(LeaveError::from)?;

    let id = result.last_insert_id();
    info!(tenant = %auth.tenant, leave_type_id = id, "Leave type created");

    let created = fetch(pool.get_ref(), &auth, id).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Replace a leave type's definition
#[utoipa::path(
    put,
    path = "/api/leave-types/{id}",
    params(("id" = u64, Path, description = "Leave type ID")),
    request_body = UpsertLeaveType,
    responses(
        (status = 200, description = "Leave type updated", body = LeaveType),
        (status = 403, description = "HR/Admin only"),
        (status = 404, description = "Leave type not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Type"
)]
pub async fn update_leave_type(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpsertLeaveType>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;
    payload.validate()?;
    let id = path.into_inner();

    sqlx::query(
        r#"
        UPDATE leave_types
        SET name = ?, description = ?, default_hours_per_year = ?, requires_approval = ?,
            requires_document = ?, applicable_gender = ?, color_code = ?
        WHERE tenant_id = ? AND id = ?
        "#,
    )
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(payload.default_hours_per_year)
    .bind(payload.requires_approval)
    .bind(payload.requires_document)
    .bind(payload.applicable_gender)
    .bind(payload.color())
    .bind(auth.tenant)
    .bind(id)
    .execute(pool.get_ref())
    .await
    .map_err(LeaveError::from)?;

    // rows_affected is 0 for unchanged rows as well, so existence is checked by re-reading
    let updated = fetch(pool.get_ref(), &auth, id).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Deactivate a leave type. Existing balances and requests are kept.
#[utoipa::path(
    delete,
    path = "/api/leave-types/{id}",
    params(("id" = u64, Path, description = "Leave type ID")),
    responses(
        (status = 204, description = "Leave type deactivated"),
        (status = 403, description = "HR/Admin only"),
        (status = 404, description = "Leave type not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Type"
)]
pub async fn delete_leave_type(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;
    let id = path.into_inner();
    fetch(pool.get_ref(), &auth, id).await?;

    sqlx::query("UPDATE leave_types SET is_active = FALSE WHERE tenant_id = ? AND id = ?")
        .bind(auth.tenant)
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(LeaveError::from)?;

    info!(tenant = %auth.tenant, leave_type_id = id, "Leave type deactivated");
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_flags_take_defaults() {
        let payload: UpsertLeaveType =
            serde_json::from_str(r#"{"name": "Sick", "default_hours_per_year": "96"}"#).unwrap();

        assert!(payload.requires_approval);
        assert!(!payload.requires_document);
        assert_eq!(payload.applicable_gender, ApplicableGender::All);
        assert_eq!(payload.color(), "#3B82F6");
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn blank_name_and_negative_hours_are_invalid() {
        let payload: UpsertLeaveType =
            serde_json::from_str(r#"{"name": " ", "default_hours_per_year": "8"}"#).unwrap();
        assert!(payload.validate().is_err());

        let payload: UpsertLeaveType =
            serde_json::from_str(r#"{"name": "Paternity", "default_hours_per_year": "-8"}"#)
                .unwrap();
        assert!(payload.validate().is_err());

        let payload: UpsertLeaveType =
            serde_json::from_str(r#"{"name": "Sick", "default_hours_per_year": "96.125"}"#)
                .unwrap();
        assert!(payload.validate().is_err());
    }
}
