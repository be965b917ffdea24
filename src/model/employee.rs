use chrono::Weekday;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::mysql_text_enum;
use super::tenant::TenantId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

mysql_text_enum!(Gender);

/// Weekday bits of the per-employee working pattern: Mon=1, Tue=2 … Sun=64.
pub fn weekday_bit(day: Weekday) -> u8 {
    1 << day.num_days_from_monday()
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "tenant_id": 1,
        "email": "john.doe@company.com",
        "first_name": "John",
        "last_name": "Doe",
        "role_id": 0,
        "gender": "male",
        "manager_id": 7,
        "daily_working_hours": "8",
        "country_code": "AE",
        "working_days": 31,
        "is_active": true
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(value_type = u64, example = 1)]
    pub tenant_id: TenantId,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = 0)]
    pub role_id: u8,

    pub gender: Gender,

    #[schema(example = 7, nullable = true)]
    pub manager_id: Option<u64>,

    /// Overrides the company default when set
    #[schema(value_type = Option<String>, example = "8")]
    pub daily_working_hours: Option<Decimal>,

    /// Country used for public holidays and the country calendar
    #[schema(example = "AE", nullable = true)]
    pub country_code: Option<String>,

    /// Weekly pattern bitmask (Mon=1 … Sun=64); overrides country and company calendars
    #[schema(example = 31, nullable = true)]
    pub working_days: Option<u8>,

    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_bits_follow_monday_first_layout() {
        assert_eq!(weekday_bit(Weekday::Mon), 1);
        assert_eq!(weekday_bit(Weekday::Tue), 2);
        assert_eq!(weekday_bit(Weekday::Wed), 4);
        assert_eq!(weekday_bit(Weekday::Thu), 8);
        assert_eq!(weekday_bit(Weekday::Fri), 16);
        assert_eq!(weekday_bit(Weekday::Sat), 32);
        assert_eq!(weekday_bit(Weekday::Sun), 64);
    }

    #[test]
    fn gender_parses_lowercase_text() {
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(Gender::Other.as_ref(), "other");
    }
}
