use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::leave_balance::BalanceKey;
use super::mysql_text_enum;
use super::tenant::TenantId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

mysql_text_enum!(LeaveStatus);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "tenant_id": 1,
    "employee_id": 1000,
    "leave_type_id": 3,
    "balance_year": 2026,
    "start_date": "2026-03-02",
    "end_date": "2026-03-06",
    "is_full_day": true,
    "leave_hours": "40",
    "total_days": "5",
    "status": "pending",
    "reason": "Family trip",
    "created_at": "2026-02-01T09:00:00Z"
}))]
pub struct LeaveRequest {
    pub id: u64,

    #[schema(value_type = u64)]
    pub tenant_id: TenantId,

    pub employee_id: u64,

    pub leave_type_id: u64,

    /// Year of the balance row this request draws from
    pub balance_year: i32,

    #[schema(example = "2026-03-02", format = "date", value_type = String)]
    pub start_date: NaiveDate,

    #[schema(example = "2026-03-06", format = "date", value_type = String)]
    pub end_date: NaiveDate,

    pub is_full_day: bool,

    #[schema(value_type = String, example = "40")]
    pub leave_hours: Decimal,

    #[schema(value_type = String, example = "5")]
    pub total_days: Decimal,

    pub status: LeaveStatus,

    pub reason: Option<String>,

    pub attachment_path: Option<String>,

    pub attachment_file_name: Option<String>,

    pub approver_id: Option<u64>,

    #[schema(format = "date-time", value_type = Option<String>)]
    pub approved_at: Option<DateTime<Utc>>,

    pub approver_comments: Option<String>,

    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,

    #[schema(format = "date-time", value_type = Option<String>)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    pub fn balance_key(&self) -> BalanceKey {
        BalanceKey {
            tenant_id: self.tenant_id,
            employee_id: self.employee_id,
            leave_type_id: self.leave_type_id,
            year: self.balance_year,
        }
    }
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub tenant_id: TenantId,
    pub employee_id: u64,
    pub leave_type_id: u64,
    pub balance_year: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_full_day: bool,
    pub leave_hours: Decimal,
    pub total_days: Decimal,
    pub status: LeaveStatus,
    pub reason: Option<String>,
    pub attachment_path: Option<String>,
    pub attachment_file_name: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl NewLeaveRequest {
    pub fn into_request(self, id: u64) -> LeaveRequest {
        LeaveRequest {
            id,
            tenant_id: self.tenant_id,
            employee_id: self.employee_id,
            leave_type_id: self.leave_type_id,
            balance_year: self.balance_year,
            start_date: self.start_date,
            end_date: self.end_date,
            is_full_day: self.is_full_day,
            leave_hours: self.leave_hours,
            total_days: self.total_days,
            status: self.status,
            reason: self.reason,
            attachment_path: self.attachment_path,
            attachment_file_name: self.attachment_file_name,
            approver_id: None,
            approved_at: self.approved_at,
            approver_comments: None,
            created_at: self.created_at,
            updated_at: None,
        }
    }
}
