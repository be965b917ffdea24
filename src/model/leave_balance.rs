use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::tenant::TenantId;
use crate::error::LeaveError;

/// Identity of a balance row; at most one row exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    pub tenant_id: TenantId,
    pub employee_id: u64,
    pub leave_type_id: u64,
    pub year: i32,
}

/// Per employee / leave type / year entitlement ledger, tracked in hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveBalance {
    pub id: u64,

    #[schema(value_type = u64)]
    pub tenant_id: TenantId,

    pub employee_id: u64,

    pub leave_type_id: u64,

    pub year: i32,

    #[schema(value_type = String, example = "168")]
    pub total_hours: Decimal,

    #[schema(value_type = String, example = "16")]
    pub used_hours: Decimal,

    #[schema(value_type = String, example = "40")]
    pub pending_hours: Decimal,

    pub note: Option<String>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A single ledger mutation, applied to one locked row.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerOp {
    /// Hold hours for a new request (pending += h).
    Reserve(Decimal),
    /// Pending hours become used on approval.
    Commit(Decimal),
    /// Pending hours are dropped on rejection or cancel-while-pending.
    Release(Decimal),
    /// Used hours are returned on cancel-after-approval.
    Refund(Decimal),
    /// HR override of the entitlement.
    AdjustTotal { total: Decimal, note: Option<String> },
}

/// Hour columns are stored as `DECIMAL(7, 2)`.
pub const HOURS_SCALE: u32 = 2;
pub const MAX_HOURS: Decimal = Decimal::from_parts(9_999_999, 0, 0, false, HOURS_SCALE);

/// Rejects hour values the database would round or truncate.
pub fn check_hours(field: &str, hours: Decimal) -> Result<(), LeaveError> {
    if hours.normalize().scale() > HOURS_SCALE {
        return Err(LeaveError::Validation(format!(
            "{field} allows at most {HOURS_SCALE} decimal places"
        )));
    }
    if hours.abs() > MAX_HOURS {
        return Err(LeaveError::Validation(format!(
            "{field} cannot exceed {MAX_HOURS} hours"
        )));
    }
    Ok(())
}

impl LeaveBalance {
    pub fn key(&self) -> BalanceKey {
        BalanceKey {
            tenant_id: self.tenant_id,
            employee_id: self.employee_id,
            leave_type_id: self.leave_type_id,
            year: self.year,
        }
    }

    /// Always derived, never stored.
    pub fn remaining_hours(&self) -> Decimal {
        self.total_hours - self.used_hours - self.pending_hours
    }

    pub fn apply(&mut self, op: &LedgerOp) -> Result<(), LeaveError> {
        match op {
            LedgerOp::Reserve(hours) => self.reserve(*hours),
            LedgerOp::Commit(hours) => self.commit(*hours),
            LedgerOp::Release(hours) => self.release(*hours),
            LedgerOp::Refund(hours) => self.refund(*hours),
            LedgerOp::AdjustTotal { total, note } => self.adjust_total(*total, note.clone()),
        }
    }

    pub fn reserve(&mut self, hours: Decimal) -> Result<(), LeaveError> {
        if hours <= Decimal::ZERO {
            return Err(LeaveError::validation("Leave hours must be greater than zero"));
        }
        let remaining = self.remaining_hours();
        if hours > remaining {
            return Err(LeaveError::InsufficientBalance {
                requested: hours,
                remaining,
            });
        }
        self.pending_hours += hours;
        Ok(())
    }

    pub fn commit(&mut self, hours: Decimal) -> Result<(), LeaveError> {
        self.ensure_covers("pending", self.pending_hours, hours)?;
        self.pending_hours -= hours;
        self.used_hours += hours;
        Ok(())
    }

    pub fn release(&mut self, hours: Decimal) -> Result<(), LeaveError> {
        self.ensure_covers("pending", self.pending_hours, hours)?;
        self.pending_hours -= hours;
        Ok(())
    }

    pub fn refund(&mut self, hours: Decimal) -> Result<(), LeaveError> {
        self.ensure_covers("used", self.used_hours, hours)?;
        self.used_hours -= hours;
        Ok(())
    }

    /// Sets the entitlement directly. Remaining hours may go negative here;
    /// HR reconciles such rows by hand.
    pub fn adjust_total(&mut self, total: Decimal, note: Option<String>) -> Result<(), LeaveError> {
        if total < Decimal::ZERO {
            return Err(LeaveError::validation("Total hours cannot be negative"));
        }
        self.total_hours = total;
        self.note = note;
        Ok(())
    }

    fn ensure_covers(&self, field: &str, held: Decimal, hours: Decimal) -> Result<(), LeaveError> {
        if hours < Decimal::ZERO || held < hours {
            let err = LeaveError::Invariant(format!(
                "{field} hours {held} cannot cover {hours} for employee {} leave type {} year {}",
                self.employee_id, self.leave_type_id, self.year
            ));
            tracing::error!(error = %err, tenant = %self.tenant_id, "Ledger invariant violated");
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn balance_with(total: i64, used: i64, pending: i64) -> LeaveBalance {
    LeaveBalance {
        id: 1,
        tenant_id: TenantId(1),
        employee_id: 10,
        leave_type_id: 3,
        year: 2026,
        total_hours: Decimal::from(total),
        used_hours: Decimal::from(used),
        pending_hours: Decimal::from(pending),
        note: None,
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_identity(b: &LeaveBalance) {
        assert_eq!(b.total_hours - b.used_hours - b.pending_hours, b.remaining_hours());
    }

    #[test]
    fn hour_values_must_fit_the_column() {
        assert!(check_hours("total_hours", Decimal::new(16850, 2)).is_ok());
        assert!(check_hours("total_hours", Decimal::new(1_500, 3)).is_ok());
        assert!(check_hours("total_hours", Decimal::new(1_005, 3)).is_err());
        assert!(check_hours("total_hours", MAX_HOURS).is_ok());
        assert!(check_hours("total_hours", MAX_HOURS + Decimal::ONE).is_err());
        assert_eq!(MAX_HOURS.to_string(), "99999.99");
    }

    #[test]
    fn reserve_moves_hours_to_pending() {
        let mut balance = balance_with(168, 0, 0);
        balance.reserve(Decimal::from(40)).unwrap();

        assert_eq!(balance.pending_hours, Decimal::from(40));
        assert_eq!(balance.remaining_hours(), Decimal::from(128));
        assert_identity(&balance);
    }

    #[test]
    fn reserve_over_remaining_fails_and_leaves_row_untouched() {
        let original = balance_with(168, 100, 28);
        for requested in [41, 42, 100, 200] {
            let mut balance = original.clone();
            let err = balance.reserve(Decimal::from(requested)).unwrap_err();
            assert!(matches!(err, LeaveError::InsufficientBalance { .. }));
            assert_eq!(balance, original);
        }
    }

    #[test]
    fn reserve_exactly_remaining_succeeds() {
        let mut balance = balance_with(16, 0, 0);
        balance.reserve(Decimal::from(16)).unwrap();
        assert_eq!(balance.remaining_hours(), Decimal::ZERO);
    }

    #[test]
    fn commit_then_refund_restores_used() {
        let mut balance = balance_with(168, 8, 16);
        balance.commit(Decimal::from(16)).unwrap();
        assert_eq!(balance.pending_hours, Decimal::ZERO);
        assert_eq!(balance.used_hours, Decimal::from(24));
        assert_identity(&balance);

        balance.refund(Decimal::from(16)).unwrap();
        assert_eq!(balance.used_hours, Decimal::from(8));
        assert_identity(&balance);
    }

    #[test]
    fn commit_without_pending_is_an_invariant_failure() {
        let mut balance = balance_with(168, 0, 8);
        let err = balance.commit(Decimal::from(16)).unwrap_err();
        assert!(matches!(err, LeaveError::Invariant(_)));
        assert_eq!(balance.pending_hours, Decimal::from(8));
    }

    #[test]
    fn release_and_refund_guard_their_fields() {
        let mut balance = balance_with(168, 4, 4);
        assert!(matches!(
            balance.release(Decimal::from(5)),
            Err(LeaveError::Invariant(_))
        ));
        assert!(matches!(
            balance.refund(Decimal::from(5)),
            Err(LeaveError::Invariant(_))
        ));
    }

    #[test]
    fn adjust_total_may_drive_remaining_negative() {
        let mut balance = balance_with(168, 100, 40);
        balance
            .adjust_total(Decimal::from(80), Some("mid-year correction".into()))
            .unwrap();

        assert_eq!(balance.remaining_hours(), Decimal::from(-60));
        assert_eq!(balance.used_hours, Decimal::from(100));
        assert_eq!(balance.pending_hours, Decimal::from(40));
        assert_eq!(balance.note.as_deref(), Some("mid-year correction"));
    }

    #[test]
    fn adjust_total_rejects_negative_entitlement() {
        let mut balance = balance_with(168, 0, 0);
        assert!(matches!(
            balance.adjust_total(Decimal::from(-1), None),
            Err(LeaveError::Validation(_))
        ));
    }

    #[test]
    fn fractional_hours_are_kept_exact() {
        let mut balance = balance_with(10, 0, 0);
        for _ in 0..3 {
            balance.reserve(Decimal::new(333, 2)).unwrap();
        }
        assert_eq!(balance.pending_hours, Decimal::new(999, 2));
        assert_eq!(balance.remaining_hours(), Decimal::new(1, 2));
    }
}
