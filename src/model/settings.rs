use chrono::{DateTime, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::tenant::TenantId;

pub const DEFAULT_DAILY_WORKING_HOURS: Decimal = Decimal::from_parts(8, 0, 0, false, 0);
pub const DEFAULT_COUNTRY_CODE: &str = "AE";

/// Seven working-day flags, one per weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct WeekPattern {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl WeekPattern {
    pub const MONDAY_TO_FRIDAY: WeekPattern = WeekPattern {
        monday: true,
        tuesday: true,
        wednesday: true,
        thursday: true,
        friday: true,
        saturday: false,
        sunday: false,
    };

    pub fn works_on(&self, day: Weekday) -> bool {
        match day {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }
}

impl Default for WeekPattern {
    fn default() -> Self {
        WeekPattern::MONDAY_TO_FRIDAY
    }
}

/// Tenant-wide defaults managed by HR.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CompanySettings {
    #[schema(value_type = u64, example = 1)]
    pub tenant_id: TenantId,

    #[schema(example = "LeaveFlow")]
    pub company_name: String,

    #[schema(value_type = String, example = "8")]
    pub default_daily_working_hours: Decimal,

    /// Smallest partial-day request accepted, in hours
    #[schema(value_type = String, example = "0.5")]
    pub min_leave_hours: Decimal,

    #[schema(example = "AE")]
    pub default_country_code: String,

    #[sqlx(flatten)]
    #[serde(flatten)]
    pub week: WeekPattern,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CompanySettings {
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            company_name: "LeaveFlow".to_string(),
            default_daily_working_hours: DEFAULT_DAILY_WORKING_HOURS,
            min_leave_hours: Decimal::new(5, 1),
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
            week: WeekPattern::MONDAY_TO_FRIDAY,
            updated_at: None,
        }
    }
}

/// Weekly pattern for a country (ISO 3166 alpha-2), shared by all tenants.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CountryWorkday {
    #[schema(example = "AE")]
    pub country_code: String,

    #[sqlx(flatten)]
    #[serde(flatten)]
    pub week: WeekPattern,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_week_is_monday_to_friday() {
        let week = WeekPattern::default();
        assert!(week.works_on(Weekday::Mon));
        assert!(week.works_on(Weekday::Fri));
        assert!(!week.works_on(Weekday::Sat));
        assert!(!week.works_on(Weekday::Sun));
    }

    #[test]
    fn new_settings_use_eight_hour_days() {
        let settings = CompanySettings::new(TenantId(1));
        assert_eq!(settings.default_daily_working_hours, Decimal::from(8));
        assert_eq!(settings.default_country_code, "AE");
    }
}
