use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::tenant::TenantId;

/// A non-working date for one country, imported or entered by HR.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PublicHoliday {
    pub id: u64,

    #[schema(value_type = u64)]
    pub tenant_id: TenantId,

    #[schema(example = "AE")]
    pub country_code: String,

    pub year: i32,

    #[schema(example = "2026-12-02", format = "date", value_type = String)]
    pub date: NaiveDate,

    #[schema(example = "National Day")]
    pub name: String,

    pub local_name: Option<String>,

    /// Entered by HR rather than imported
    pub is_custom: bool,

    /// Imported, then edited by HR
    pub is_modified: bool,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}

pub(crate) const HOLIDAY_COLUMNS: &str =
    "id, tenant_id, country_code, year, date, name, local_name, is_custom, is_modified, created_at";
