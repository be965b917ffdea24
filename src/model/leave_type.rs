use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::employee::{Employee, Gender};
use super::mysql_text_enum;
use super::tenant::TenantId;

/// Which employees may hold a balance of a leave type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplicableGender {
    All,
    Male,
    Female,
}

mysql_text_enum!(ApplicableGender);

impl ApplicableGender {
    pub fn admits(self, gender: Gender) -> bool {
        match self {
            ApplicableGender::All => true,
            ApplicableGender::Male => gender == Gender::Male,
            ApplicableGender::Female => gender == Gender::Female,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 3,
        "tenant_id": 1,
        "name": "Annual",
        "description": "Yearly paid leave",
        "default_hours_per_year": "168",
        "requires_approval": true,
        "requires_document": false,
        "applicable_gender": "all",
        "color_code": "#059669",
        "is_active": true
    })
)]
pub struct LeaveType {
    pub id: u64,

    #[schema(value_type = u64)]
    pub tenant_id: TenantId,

    pub name: String,

    pub description: Option<String>,

    /// Yearly entitlement for an 8-hour working day
    #[schema(value_type = String, example = "168")]
    pub default_hours_per_year: Decimal,

    pub requires_approval: bool,

    pub requires_document: bool,

    pub applicable_gender: ApplicableGender,

    pub color_code: String,

    pub is_active: bool,
}

impl LeaveType {
    /// Active and open to the employee's gender.
    pub fn available_to(&self, employee: &Employee) -> bool {
        self.is_active && self.applicable_gender.admits(employee.gender)
    }
}
