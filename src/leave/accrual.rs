//! Pro-rata accrual projection and the balance view built on top of it.
//! Nothing here is persisted; values are recomputed on every read.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::duration::{hours_to_days, resolve_daily_hours};
use crate::error::LeaveError;
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_type::LeaveType;
use crate::model::tenant::TenantId;
use crate::store::LeaveStore;

fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

/// Share of `total` earned by `on`: `total * day_of_year / days_in_year`,
/// never more than `total`.
pub fn accrued_hours(total: Decimal, on: NaiveDate) -> Decimal {
    let elapsed = Decimal::from(on.ordinal());
    let year_days = Decimal::from(days_in_year(on.year()));
    let accrued = match total.checked_mul(elapsed) {
        Some(scaled) => scaled / year_days,
        None => (total / year_days).checked_mul(elapsed).unwrap_or(total),
    };
    accrued.min(total)
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BalanceSummary {
    pub id: u64,
    pub leave_type_id: u64,
    #[schema(example = "Annual")]
    pub leave_type_name: String,
    #[schema(example = "#059669")]
    pub leave_type_color: String,
    pub year: i32,

    #[schema(value_type = String, example = "168")]
    pub total_hours: Decimal,
    #[schema(value_type = String, example = "16")]
    pub used_hours: Decimal,
    #[schema(value_type = String, example = "40")]
    pub pending_hours: Decimal,
    #[schema(value_type = String, example = "112")]
    pub remaining_hours: Decimal,
    #[schema(value_type = String, example = "83.77")]
    pub accrued_hours: Decimal,

    #[schema(value_type = String, example = "21")]
    pub total_days: Decimal,
    #[schema(value_type = String, example = "2")]
    pub used_days: Decimal,
    #[schema(value_type = String, example = "5")]
    pub pending_days: Decimal,
    #[schema(value_type = String, example = "14")]
    pub remaining_days: Decimal,
    #[schema(value_type = String, example = "10.47")]
    pub accrued_days: Decimal,
}

impl BalanceSummary {
    pub fn new(
        balance: &LeaveBalance,
        leave_type: Option<&LeaveType>,
        daily_hours: Decimal,
        today: NaiveDate,
    ) -> Result<Self, LeaveError> {
        let accrued = accrued_hours(balance.total_hours, today);
        let remaining = balance.remaining_hours();
        Ok(Self {
            id: balance.id,
            leave_type_id: balance.leave_type_id,
            leave_type_name: leave_type.map(|t| t.name.clone()).unwrap_or_default(),
            leave_type_color: leave_type.map(|t| t.color_code.clone()).unwrap_or_default(),
            year: balance.year,
            total_hours: balance.total_hours,
            used_hours: balance.used_hours,
            pending_hours: balance.pending_hours,
            remaining_hours: remaining,
            accrued_hours: accrued.round_dp(2),
            total_days: hours_to_days(balance.total_hours, daily_hours)?,
            used_days: hours_to_days(balance.used_hours, daily_hours)?,
            pending_days: hours_to_days(balance.pending_hours, daily_hours)?,
            remaining_days: hours_to_days(remaining, daily_hours)?,
            accrued_days: hours_to_days(accrued, daily_hours)?,
        })
    }
}

/// Current-year balances of one employee with accrual as of `today`.
pub async fn employee_summaries<S: LeaveStore>(
    store: &S,
    tenant: TenantId,
    employee_id: u64,
    today: NaiveDate,
) -> Result<Vec<BalanceSummary>, LeaveError> {
    let employee = store
        .employee(tenant, employee_id)
        .await?
        .ok_or_else(|| LeaveError::not_found("Employee"))?;
    let settings = store.company_settings(tenant).await?;
    let daily_hours = resolve_daily_hours(&employee, settings.as_ref());

    let balances = store.balances(tenant, employee_id, today.year()).await?;
    let mut summaries = Vec::with_capacity(balances.len());
    for balance in &balances {
        let leave_type = store.leave_type(tenant, balance.leave_type_id).await?;
        summaries.push(BalanceSummary::new(
            balance,
            leave_type.as_ref(),
            daily_hours,
            today,
        )?);
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leave::testing::{date, employee, leave_type};
    use crate::model::leave_balance::balance_with;
    use crate::store::memory::MemoryStore;

    #[test]
    fn day_182_of_common_year() {
        // 2026-07-01 is day 182
        let accrued = accrued_hours(Decimal::from(168), date(2026, 7, 1));
        assert_eq!(accrued.round_dp(2), Decimal::new(8377, 2));
    }

    #[test]
    fn capped_at_total_on_last_day() {
        assert_eq!(
            accrued_hours(Decimal::from(168), date(2026, 12, 31)),
            Decimal::from(168)
        );
        assert_eq!(
            accrued_hours(Decimal::from(168), date(2028, 12, 31)),
            Decimal::from(168)
        );
    }

    #[test]
    fn leap_year_uses_366_days() {
        // 2028-12-30 is day 365 of 366
        let accrued = accrued_hours(Decimal::from(366), date(2028, 12, 30));
        assert_eq!(accrued, Decimal::from(365));
        assert_eq!(accrued_hours(Decimal::from(366), date(2028, 1, 1)), Decimal::ONE);
    }

    #[test]
    fn accrual_is_independent_of_usage() {
        let fresh = balance_with(168, 0, 0);
        let busy = balance_with(168, 120, 40);
        let on = date(2026, 7, 1);
        let eight = Decimal::from(8);

        let a = BalanceSummary::new(&fresh, None, eight, on).unwrap();
        let b = BalanceSummary::new(&busy, None, eight, on).unwrap();
        assert_eq!(a.accrued_hours, b.accrued_hours);
        assert_eq!(b.remaining_hours, Decimal::from(8));
        assert_eq!(b.remaining_days, Decimal::ONE);
    }

    #[test]
    fn summary_reports_overflowing_conversion() {
        let mut balance = balance_with(0, 0, 0);
        balance.total_hours = Decimal::MAX;

        let err = BalanceSummary::new(&balance, None, Decimal::new(1, 2), date(2026, 7, 1))
            .unwrap_err();
        assert!(matches!(err, LeaveError::Validation(_)));
    }

    #[test]
    fn summary_converts_with_daily_hours() {
        let balance = balance_with(168, 15, 0);
        let lt = leave_type(3, true);

        let summary =
            BalanceSummary::new(&balance, Some(&lt), Decimal::new(75, 1), date(2026, 7, 1))
                .unwrap();

        assert_eq!(summary.leave_type_name, "Type 3");
        assert_eq!(summary.total_days, Decimal::new(2240, 2));
        assert_eq!(summary.used_days, Decimal::from(2));
        assert_eq!(summary.accrued_hours, Decimal::new(8377, 2));
        // 83.7699 / 7.5 = 11.169
        assert_eq!(summary.accrued_days, Decimal::new(1117, 2));
    }

    #[actix_web::test]
    async fn reading_twice_gives_identical_results() {
        let store = MemoryStore::new();
        store.put_employee(employee(10)).await;
        store.put_leave_type(leave_type(3, true)).await;
        store.put_balance(balance_with(168, 16, 8)).await;
        let today = date(2026, 7, 1);

        let first = employee_summaries(&store, TenantId(1), 10, today).await.unwrap();
        let second = employee_summaries(&store, TenantId(1), 10, today).await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
        assert_eq!(first[0].remaining_hours, Decimal::from(144));
    }

    #[actix_web::test]
    async fn only_current_year_rows_are_listed() {
        let store = MemoryStore::new();
        store.put_employee(employee(10)).await;
        let mut last_year = balance_with(168, 0, 0);
        last_year.year = 2025;
        store.put_balance(last_year).await;

        let rows = employee_summaries(&store, TenantId(1), 10, date(2026, 7, 1))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
