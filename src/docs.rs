use crate::api::employee::{CreateEmployee, CreatedEmployee};
use crate::api::holiday::HolidayInput;
use crate::api::leave_balance::AssignBalance;
use crate::api::leave_request::{LeaveFilter, LeaveListResponse};
use crate::api::leave_type::UpsertLeaveType;
use crate::api::settings::UpdateSettings;
use crate::leave::accrual::BalanceSummary;
use crate::leave::workflow::{CreateLeave, Decision};
use crate::model::employee::{Employee, Gender};
use crate::model::holiday::PublicHoliday;
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::leave_type::{ApplicableGender, LeaveType};
use crate::model::notification::{NotificationKind, StoredNotification};
use crate::model::settings::{CompanySettings, CountryWorkday, WeekPattern};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leaveflow API",
        version = "1.0.0",
        description = r#"
## Leave balance and accrual engine

Multi-tenant leave management: employees file requests in **hours**, balances
are reserved while a request is pending and consumed when it is approved.

### 🔹 Key Features
- **Leave Requests**
  - Apply, approve/reject, cancel, and view leave history
- **Balances**
  - Yearly entitlements per leave type with pro-rata accrual to date
- **Calendars**
  - Company and country work weeks, per-employee overrides, public holidays
- **Notifications**
  - In-app inbox for decisions and balance changes

### 🔐 Security
Every endpoint requires a **JWT Bearer** token carrying the tenant, employee and role.
Write access to leave types, settings, balances, holidays and employees is limited to **HR/Admin**.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::pending_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::decide_leave,
        crate::api::leave_request::cancel_leave,

        crate::api::leave_balance::my_balances,
        crate::api::leave_balance::employee_balances,
        crate::api::leave_balance::assign_balance,

        crate::api::leave_type::list_leave_types,
        crate::api::leave_type::create_leave_type,
        crate::api::leave_type::update_leave_type,
        crate::api::leave_type::delete_leave_type,

        crate::api::settings::get_settings,
        crate::api::settings::update_settings,
        crate::api::settings::get_country_workdays,
        crate::api::settings::upsert_country_workdays,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,

        crate::api::holiday::list_holidays,
        crate::api::holiday::create_holiday,
        crate::api::holiday::update_holiday,
        crate::api::holiday::delete_holiday,

        crate::api::notification::list_notifications,
        crate::api::notification::mark_read,
        crate::api::notification::mark_all_read
    ),
    components(
        schemas(
            LeaveFilter,
            LeaveRequest,
            LeaveStatus,
            LeaveListResponse,
            CreateLeave,
            Decision,
            BalanceSummary,
            LeaveBalance,
            AssignBalance,
            LeaveType,
            ApplicableGender,
            UpsertLeaveType,
            CompanySettings,
            WeekPattern,
            CountryWorkday,
            UpdateSettings,
            Employee,
            Gender,
            CreateEmployee,
            CreatedEmployee,
            PublicHoliday,
            HolidayInput,
            StoredNotification,
            NotificationKind
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave request APIs"),
        (name = "Leave Balance", description = "Balance and accrual APIs"),
        (name = "Leave Type", description = "Leave type catalogue APIs"),
        (name = "Settings", description = "Company and country calendar APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Holiday", description = "Public holiday calendar APIs"),
        (name = "Notification", description = "In-app notification APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented_with_bearer_auth() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/leave/{leave_id}/approve"));
        assert!(doc.paths.paths.contains_key("/api/notifications/read-all"));
        assert!(doc.paths.paths.contains_key("/api/holidays/{country_code}/{year}"));
        assert!(doc.paths.paths.contains_key("/api/holidays/{id}"));
        let schemes = &doc.components.as_ref().unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
