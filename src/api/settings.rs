use crate::api::AppWorkflow;
use crate::auth::auth::AuthUser;
use crate::error::LeaveError;
use crate::model::leave_balance::check_hours;
use crate::model::settings::{CompanySettings, CountryWorkday, WeekPattern};
use crate::model::tenant::TenantId;
use crate::store::LeaveStore;
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

/// Any subset of the company settings; omitted fields keep their value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSettings {
    pub company_name: Option<String>,
    #[schema(value_type = Option<String>, example = "8")]
    pub default_daily_working_hours: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "0.5")]
    pub min_leave_hours: Option<Decimal>,
    #[schema(example = "AE")]
    pub default_country_code: Option<String>,
    pub monday: Option<bool>,
    pub tuesday: Option<bool>,
    pub wednesday: Option<bool>,
    pub thursday: Option<bool>,
    pub friday: Option<bool>,
    pub saturday: Option<bool>,
    pub sunday: Option<bool>,
}

impl UpdateSettings {
    fn apply_to(self, settings: &mut CompanySettings) -> Result<(), LeaveError> {
        if let Some(name) = self.company_name {
            settings.company_name = name;
        }
        if let Some(hours) = self.default_daily_working_hours {
            if hours <= Decimal::ZERO || hours > Decimal::from(24) {
                return Err(LeaveError::validation(
                    "default_daily_working_hours must be between 0 and 24",
                ));
            }
            check_hours("default_daily_working_hours", hours)?;
            settings.default_daily_working_hours = hours;
        }
        if let Some(min) = self.min_leave_hours {
            if min < Decimal::ZERO {
                return Err(LeaveError::validation("min_leave_hours cannot be negative"));
            }
            check_hours("min_leave_hours", min)?;
            settings.min_leave_hours = min;
        }
        if let Some(code) = self.default_country_code {
            settings.default_country_code = normalize_country(&code)?;
        }

        let week = &mut settings.week;
        for (flag, slot) in [
            (self.monday, &mut week.monday),
            (self.tuesday, &mut week.tuesday),
            (self.wednesday, &mut week.wednesday),
            (self.thursday, &mut week.thursday),
            (self.friday, &mut week.friday),
            (self.saturday, &mut week.saturday),
            (self.sunday, &mut week.sunday),
        ] {
            if let Some(value) = flag {
                *slot = value;
            }
        }
        Ok(())
    }
}

pub(crate) fn normalize_country(code: &str) -> Result<String, LeaveError> {
    let code = code.trim().to_uppercase();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(LeaveError::Validation(format!(
            "'{code}' is not an ISO 3166 alpha-2 country code"
        )));
    }
    Ok(code)
}

async fn current_settings(
    workflow: &AppWorkflow,
    tenant: TenantId,
) -> Result<CompanySettings, LeaveError> {
    Ok(workflow
        .store()
        .company_settings(tenant)
        .await?
        .unwrap_or_else(|| CompanySettings::new(tenant)))
}

/// Company settings (defaults when never saved)
#[utoipa::path(
    get,
    path = "/api/settings",
    responses((status = 200, description = "Company settings", body = CompanySettings)),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_settings(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
) -> actix_web::Result<impl Responder> {
    let settings = current_settings(&workflow, auth.tenant).await?;
    Ok(HttpResponse::Ok().json(settings))
}

/// Update company settings
#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = UpdateSettings,
    responses(
        (status = 200, description = "Settings saved", body = CompanySettings),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn update_settings(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpdateSettings>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;

    let mut settings = current_settings(&workflow, auth.tenant).await?;
    payload.into_inner().apply_to(&mut settings)?;
    settings.updated_at = Some(Utc::now());

    let w = &settings.week;
    sqlx::query(
        r#"
        INSERT INTO company_settings
            (tenant_id, company_name, default_daily_working_hours, min_leave_hours,
             default_country_code, monday, tuesday, wednesday, thursday, friday, saturday,
             sunday, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            company_name = VALUES(company_name),
            default_daily_working_hours = VALUES(default_daily_working_hours),
            min_leave_hours = VALUES(min_leave_hours),
            default_country_code = VALUES(default_country_code),
            monday = VALUES(monday), tuesday = VALUES(tuesday),
            wednesday = VALUES(wednesday), thursday = VALUES(thursday),
            friday = VALUES(friday), saturday = VALUES(saturday), sunday = VALUES(sunday),
            updated_at = VALUES(updated_at)
        "#,
    )
    .bind(settings.tenant_id)
    .bind(&settings.company_name)
    .bind(settings.default_daily_working_hours)
    .bind(settings.min_leave_hours)
    .bind(&settings.default_country_code)
    .bind(w.monday)
    .bind(w.tuesday)
    .bind(w.wednesday)
    .bind(w.thursday)
    .bind(w.friday)
    .bind(w.saturday)
    .bind(w.sunday)
    .bind(settings.updated_at)
    .execute(pool.get_ref())
    .await
    .map_err(LeaveError::from)?;

    info!(tenant = %auth.tenant, "Company settings updated");
    Ok(HttpResponse::Ok().json(settings))
}

/// Weekly pattern of a country (Monday to Friday when none is configured)
#[utoipa::path(
    get,
    path = "/api/settings/country/{code}",
    params(("code" = String, Path, description = "ISO 3166 alpha-2 country code")),
    responses((status = 200, description = "Country workdays", body = CountryWorkday)),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_country_workdays(
    _auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let code = normalize_country(&path.into_inner())?;
    let workday = workflow
        .store()
        .country_workday(&code)
        .await?
        .unwrap_or(CountryWorkday {
            country_code: code,
            week: WeekPattern::MONDAY_TO_FRIDAY,
        });
    Ok(HttpResponse::Ok().json(workday))
}

/// Create or replace a country's weekly pattern
#[utoipa::path(
    post,
    path = "/api/settings/country",
    request_body = CountryWorkday,
    responses(
        (status = 200, description = "Country workdays saved", body = CountryWorkday),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn upsert_country_workdays(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CountryWorkday>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;

    let mut workday = payload.into_inner();
    workday.country_code = normalize_country(&workday.country_code)?;
    let w = &workday.week;

    sqlx::query(
        r#"
        INSERT INTO country_workdays
            (country_code, monday, tuesday, wednesday, thursday, friday, saturday, sunday)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            monday = VALUES(monday), tuesday = VALUES(tuesday),
            wednesday = VALUES(wednesday), thursday = VALUES(thursday),
            friday = VALUES(friday), saturday = VALUES(saturday), sunday = VALUES(sunday)
        "#,
    )
    .bind(&workday.country_code)
    .bind(w.monday)
    .bind(w.tuesday)
    .bind(w.wednesday)
    .bind(w.thursday)
    .bind(w.friday)
    .bind(w.saturday)
    .bind(w.sunday)
    .execute(pool.get_ref())
    .await
    .map_err(LeaveError::from)?;

    info!(country = %workday.country_code, "Country workdays saved");
    Ok(HttpResponse::Ok().json(workday))
}
