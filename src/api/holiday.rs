use crate::api::AppWorkflow;
use crate::api::settings::normalize_country;
use crate::auth::auth::AuthUser;
use crate::error::LeaveError;
use crate::model::holiday::{HOLIDAY_COLUMNS, PublicHoliday};
use crate::model::tenant::TenantId;
use crate::store::mysql::insert_conflict;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct HolidayInput {
    #[schema(example = "2026-12-02", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "National Day")]
    pub name: String,
    pub local_name: Option<String>,
    #[schema(example = "AE")]
    pub country_code: String,
}

impl HolidayInput {
    /// Trims the name and normalizes the country code.
    fn validate(mut self) -> Result<Self, LeaveError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(LeaveError::validation("Name is required"));
        }
        self.country_code = normalize_country(&self.country_code)?;
        Ok(self)
    }

    fn local_name(&self) -> &str {
        self.local_name.as_deref().unwrap_or(&self.name)
    }
}

async fn fetch(pool: &MySqlPool, tenant: TenantId, id: u64) -> Result<PublicHoliday, LeaveError> {
    let sql = format!("SELECT {HOLIDAY_COLUMNS} FROM public_holidays WHERE tenant_id = ? AND id = ?");
    sqlx::query_as::<_, PublicHoliday>(&sql)
        .bind(tenant)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| LeaveError::not_found("Holiday"))
}

/// Public holidays of a country for one year
#[utoipa::path(
    get,
    path = "/api/holidays/{country_code}/{year}",
    params(
        ("country_code" = String, Path, description = "ISO 3166 alpha-2 country code"),
        ("year" = i32, Path, description = "Calendar year")
    ),
    responses(
        (status = 200, description = "Holidays ordered by date", body = [PublicHoliday]),
        (status = 400, description = "Invalid country code")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn list_holidays(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(String, i32)>,
) -> actix_web::Result<impl Responder> {
    let (country_code, year) = path.into_inner();
    let country_code = normalize_country(&country_code)?;

    let sql = format!(
        "SELECT {HOLIDAY_COLUMNS} FROM public_holidays \
         WHERE tenant_id = ? AND country_code = ? AND year = ? ORDER BY date"
    );
    let rows = sqlx::query_as::<_, PublicHoliday>(&sql)
        .bind(auth.tenant)
        .bind(&country_code)
        .bind(year)
        .fetch_all(pool.get_ref())
        .await
        .map_err(LeaveError::from)?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Add a company-specific holiday
#[utoipa::path(
    post,
    path = "/api/holidays",
    request_body = HolidayInput,
    responses(
        (status = 201, description = "Holiday added", body = PublicHoliday),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "HR/Admin only"),
        (status = 409, description = "A holiday already exists on that date")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn create_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    workflow: web::Data<AppWorkflow>,
    payload: web::Json<HolidayInput>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;
    let input = payload.into_inner().validate()?;
    let year = input.date.year();

    let result = sqlx::query(
        r#"
        INSERT INTO public_holidays
            (tenant_id, country_code, year, date, name, local_name, is_custom, is_modified,
             created_at)
        VALUES (?, ?, ?, ?, ?, ?, TRUE, FALSE, ?)
        "#,
    )
    .bind(auth.tenant)
    .bind(&input.country_code)
    .bind(year)
    .bind(input.date)
    .bind(&input.name)
    .bind(input.local_name())
    .bind(Utc::now())
    .execute(pool.get_ref())
    .await
    .map_err(insert_conflict)?;

    workflow
        .holidays()
        .invalidate(auth.tenant, &input.country_code, year)
        .await;
    info!(tenant = %auth.tenant, country = %input.country_code, date = %input.date, "Holiday added");

    let created = fetch(pool.get_ref(), auth.tenant, result.last_insert_id()).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Edit a holiday; imported ones are flagged as modified
#[utoipa::path(
    put,
    path = "/api/holidays/{id}",
    params(("id" = u64, Path, description = "Holiday ID")),
    request_body = HolidayInput,
    responses(
        (status = 200, description = "Holiday updated", body = PublicHoliday),
        (status = 403, description = "HR/Admin only"),
        (status = 404, description = "Holiday not found"),
        (status = 409, description = "A holiday already exists on that date")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn update_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    workflow: web::Data<AppWorkflow>,
    path: web::Path<u64>,
    payload: web::Json<HolidayInput>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;
    let id = path.into_inner();
    let input = payload.into_inner().validate()?;
    let previous = fetch(pool.get_ref(), auth.tenant, id).await?;

    sqlx::query(
        r#"
        UPDATE public_holidays
        SET country_code = ?, year = ?, date = ?, name = ?, local_name = ?, is_modified = TRUE
        WHERE tenant_id = ? AND id = ?
        "#,
    )
    .bind(&input.country_code)
    .bind(input.date.year())
    .bind(input.date)
    .bind(&input.name)
    .bind(input.local_name())
    .bind(auth.tenant)
    .bind(id)
    .execute(pool.get_ref())
    .await
    .map_err(insert_conflict)?;

    let calendar = workflow.holidays();
    calendar
        .invalidate(auth.tenant, &previous.country_code, previous.year)
        .await;
    calendar
        .invalidate(auth.tenant, &input.country_code, input.date.year())
        .await;
    info!(tenant = %auth.tenant, holiday_id = id, "Holiday updated");

    let updated = fetch(pool.get_ref(), auth.tenant, id).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Remove a holiday
#[utoipa::path(
    delete,
    path = "/api/holidays/{id}",
    params(("id" = u64, Path, description = "Holiday ID")),
    responses(
        (status = 204, description = "Holiday removed"),
        (status = 403, description = "HR/Admin only"),
        (status = 404, description = "Holiday not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn delete_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    workflow: web::Data<AppWorkflow>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;
    let id = path.into_inner();
    let holiday = fetch(pool.get_ref(), auth.tenant, id).await?;

    sqlx::query("DELETE FROM public_holidays WHERE tenant_id = ? AND id = ?")
        .bind(auth.tenant)
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(LeaveError::from)?;

    workflow
        .holidays()
        .invalidate(auth.tenant, &holiday.country_code, holiday.year)
        .await;
    info!(tenant = %auth.tenant, holiday_id = id, "Holiday removed");

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(json: &str) -> HolidayInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn input_is_normalized() {
        let holiday =
            input(r#"{"date": "2026-12-02", "name": " National Day ", "country_code": "ae"}"#)
                .validate()
                .unwrap();

        assert_eq!(holiday.name, "National Day");
        assert_eq!(holiday.country_code, "AE");
        assert_eq!(holiday.local_name(), "National Day");
    }

    #[test]
    fn blank_name_or_bad_country_is_rejected() {
        assert!(
            input(r#"{"date": "2026-12-02", "name": "  ", "country_code": "AE"}"#)
                .validate()
                .is_err()
        );
        assert!(
            input(r#"{"date": "2026-12-02", "name": "Eid", "country_code": "UAE"}"#)
                .validate()
                .is_err()
        );
    }
}
