//! Transactional application of ledger operations, plus the HR-side
//! entry points that create or reset balance rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::instrument;

use super::duration::resolve_daily_hours;
use super::notify::{NotificationSink, deliver};
use crate::error::LeaveError;
use crate::model::employee::Employee;
use crate::model::leave_balance::{BalanceKey, LeaveBalance, LedgerOp, check_hours};
use crate::model::notification::{Notification, NotificationKind};
use crate::model::settings::DEFAULT_DAILY_WORKING_HOURS;
use crate::model::tenant::TenantId;
use crate::store::{LeaveStore, LeaveTx};

/// Locks the row for `key`, applies `op` and writes it back inside `tx`.
///
/// A missing row is `NotFound`; a rejected op leaves the row untouched.
pub async fn apply<T: LeaveTx>(
    tx: &mut T,
    key: &BalanceKey,
    op: &LedgerOp,
    now: DateTime<Utc>,
) -> Result<LeaveBalance, LeaveError> {
    let mut balance = tx
        .lock_balance(key)
        .await?
        .ok_or_else(|| LeaveError::not_found("Leave balance"))?;

    balance.apply(op)?;
    balance.updated_at = Some(now);
    tx.save_balance(&balance).await?;

    tracing::debug!(
        tenant = %key.tenant_id,
        employee_id = key.employee_id,
        leave_type_id = key.leave_type_id,
        year = key.year,
        ?op,
        remaining = %balance.remaining_hours(),
        "Ledger op applied"
    );
    Ok(balance)
}

/// Yearly entitlement scaled from the 8-hour reference day to `daily_hours`.
pub fn scaled_entitlement(default_hours_per_year: Decimal, daily_hours: Decimal) -> Decimal {
    (default_hours_per_year * daily_hours / DEFAULT_DAILY_WORKING_HOURS).round_dp(2)
}

/// A first-time assignment that loses the insert race is retried as an update.
const ASSIGN_ATTEMPTS: u32 = 3;

pub struct BalanceLedger<'a, S, N: ?Sized> {
    store: &'a S,
    notifier: &'a N,
}

impl<'a, S: LeaveStore, N: NotificationSink + ?Sized> BalanceLedger<'a, S, N> {
    pub fn new(store: &'a S, notifier: &'a N) -> Self {
        Self { store, notifier }
    }

    /// HR assignment: resets the total of an existing row, or opens a new
    /// row with nothing used or pending. The employee is notified afterwards.
    #[instrument(skip(self, note), fields(tenant = %tenant))]
    pub async fn assign(
        &self,
        tenant: TenantId,
        employee_id: u64,
        leave_type_id: u64,
        year: i32,
        total: Decimal,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<LeaveBalance, LeaveError> {
        if total < Decimal::ZERO {
            return Err(LeaveError::validation("Total hours cannot be negative"));
        }
        check_hours("total_hours", total)?;
        self.store
            .employee(tenant, employee_id)
            .await?
            .ok_or_else(|| LeaveError::not_found("Employee"))?;
        let leave_type = self
            .store
            .leave_type(tenant, leave_type_id)
            .await?
            .ok_or_else(|| LeaveError::not_found("Leave type"))?;

        let key = BalanceKey {
            tenant_id: tenant,
            employee_id,
            leave_type_id,
            year,
        };

        let mut attempt = 1;
        let balance = loop {
            match self.write_total(&key, total, note.clone(), now).await {
                Err(LeaveError::Conflict(reason)) if attempt < ASSIGN_ATTEMPTS => {
                    tracing::warn!(attempt, %reason, "Balance row created concurrently, retrying");
                    attempt += 1;
                }
                result => break result?,
            }
        };

        tracing::info!(
            employee_id,
            leave_type_id,
            year,
            total = %balance.total_hours,
            "Leave balance assigned"
        );

        deliver(
            self.notifier,
            Notification {
                tenant_id: tenant,
                user_id: employee_id,
                title: "Balance Updated".into(),
                message: format!(
                    "Your {} balance for {} has been updated to {} hours.",
                    leave_type.name, year, balance.total_hours
                ),
                kind: NotificationKind::Info,
                related_entity_id: Some(leave_type_id),
            },
        )
        .await;

        Ok(balance)
    }

    /// Resets the total of the row at `key`, creating it when absent.
    async fn write_total(
        &self,
        key: &BalanceKey,
        total: Decimal,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<LeaveBalance, LeaveError> {
        let mut tx = self.store.begin().await?;
        let balance = match tx.lock_balance(key).await? {
            Some(_) => apply(&mut tx, key, &LedgerOp::AdjustTotal { total, note }, now).await?,
            None => tx.insert_balance(key, total, note).await?,
        };
        tx.commit().await?;
        Ok(balance)
    }

    /// Opens a row for every active leave type the employee is eligible
    /// for. Existing rows are left alone. Returns the rows created.
    #[instrument(skip(self, employee), fields(tenant = %tenant, employee_id = employee.id))]
    pub async fn provision(
        &self,
        tenant: TenantId,
        employee: &Employee,
        year: i32,
    ) -> Result<Vec<LeaveBalance>, LeaveError> {
        let settings = self.store.company_settings(tenant).await?;
        let daily_hours = resolve_daily_hours(employee, settings.as_ref());
        let types: Vec<_> = self
            .store
            .active_leave_types(tenant)
            .await?
            .into_iter()
            .filter(|t| t.available_to(employee))
            .collect();

        let mut tx = self.store.begin().await?;
        let mut created = Vec::new();
        for leave_type in &types {
            let key = BalanceKey {
                tenant_id: tenant,
                employee_id: employee.id,
                leave_type_id: leave_type.id,
                year,
            };
            if tx.lock_balance(&key).await?.is_some() {
                continue;
            }
            let total = scaled_entitlement(leave_type.default_hours_per_year, daily_hours);
            created.push(tx.insert_balance(&key, total, None).await?);
        }
        tx.commit().await?;

        tracing::info!(year, created = created.len(), "Leave balances provisioned");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leave::testing::{FailingSink, RecordingSink, employee, leave_type};
    use crate::model::employee::Gender;
    use crate::model::leave_balance::balance_with;
    use crate::model::leave_type::ApplicableGender;
    use crate::store::memory::MemoryStore;

    fn key(year: i32) -> BalanceKey {
        BalanceKey {
            tenant_id: TenantId(1),
            employee_id: 10,
            leave_type_id: 3,
            year,
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.put_employee(employee(10)).await;
        store.put_leave_type(leave_type(3, true)).await;
        store
    }

    #[actix_web::test]
    async fn apply_without_row_is_not_found() {
        let store = seeded().await;
        let mut tx = store.begin().await.unwrap();

        let err = apply(&mut tx, &key(2026), &LedgerOp::Reserve(Decimal::from(8)), Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, LeaveError::NotFound(_)));
    }

    #[actix_web::test]
    async fn uncommitted_apply_is_discarded() {
        let store = seeded().await;
        store.put_balance(balance_with(168, 0, 0)).await;

        {
            let mut tx = store.begin().await.unwrap();
            apply(&mut tx, &key(2026), &LedgerOp::Reserve(Decimal::from(8)), Utc::now())
                .await
                .unwrap();
        }

        let balance = store.balance(&key(2026)).await.unwrap();
        assert_eq!(balance.pending_hours, Decimal::ZERO);
    }

    #[actix_web::test]
    async fn assign_creates_missing_row_and_notifies() {
        let store = seeded().await;
        let sink = RecordingSink::default();
        let ledger = BalanceLedger::new(&store, &sink);

        let balance = ledger
            .assign(TenantId(1), 10, 3, 2027, Decimal::from(120), None, Utc::now())
            .await
            .unwrap();

        assert_eq!(balance.total_hours, Decimal::from(120));
        assert_eq!(balance.used_hours, Decimal::ZERO);
        assert!(store.balance(&key(2027)).await.is_some());

        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "Balance Updated");
        assert_eq!(sent[0].user_id, 10);
    }

    #[actix_web::test]
    async fn assign_on_existing_row_keeps_used_and_pending() {
        let store = seeded().await;
        store.put_balance(balance_with(168, 100, 40)).await;
        let ledger = BalanceLedger::new(&store, &FailingSink);

        let balance = ledger
            .assign(
                TenantId(1),
                10,
                3,
                2026,
                Decimal::from(80),
                Some("mid-year correction".into()),
                Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(balance.remaining_hours(), Decimal::from(-60));
        let stored = store.balance(&key(2026)).await.unwrap();
        assert_eq!(stored.used_hours, Decimal::from(100));
        assert_eq!(stored.note.as_deref(), Some("mid-year correction"));
    }

    #[actix_web::test]
    async fn assign_losing_insert_race_updates_the_rival_row() {
        let store = seeded().await;
        let mut rival = balance_with(168, 16, 8);
        rival.year = 2027;
        store.race_next_balance_insert(rival).await;
        let sink = RecordingSink::default();
        let ledger = BalanceLedger::new(&store, &sink);

        let balance = ledger
            .assign(TenantId(1), 10, 3, 2027, Decimal::from(120), None, Utc::now())
            .await
            .unwrap();

        assert_eq!(balance.total_hours, Decimal::from(120));
        let stored = store.balance(&key(2027)).await.unwrap();
        assert_eq!(stored.total_hours, Decimal::from(120));
        assert_eq!(stored.used_hours, Decimal::from(16));
        assert_eq!(stored.pending_hours, Decimal::from(8));
        assert_eq!(sink.sent().len(), 1);
    }

    #[actix_web::test]
    async fn assign_rejects_totals_the_column_would_round() {
        let store = seeded().await;
        let ledger = BalanceLedger::new(&store, &FailingSink);

        let err = ledger
            .assign(TenantId(1), 10, 3, 2026, Decimal::new(1_005, 3), None, Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, LeaveError::Validation(_)));
        assert!(store.balance(&key(2026)).await.is_none());
    }

    #[actix_web::test]
    async fn assign_rejects_unknown_leave_type() {
        let store = seeded().await;
        let sink = RecordingSink::default();
        let ledger = BalanceLedger::new(&store, &sink);

        let err = ledger
            .assign(TenantId(1), 10, 99, 2026, Decimal::from(8), None, Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, LeaveError::NotFound(_)));
        assert!(sink.sent().is_empty());
    }

    #[actix_web::test]
    async fn provision_respects_gender_and_daily_hours() {
        let store = MemoryStore::new();
        let mut maternity = leave_type(4, true);
        maternity.applicable_gender = ApplicableGender::Female;
        let mut retired = leave_type(5, true);
        retired.is_active = false;
        store.put_leave_type(leave_type(3, true)).await;
        store.put_leave_type(maternity).await;
        store.put_leave_type(retired).await;

        let mut emp = employee(10);
        emp.gender = Gender::Male;
        emp.daily_working_hours = Some(Decimal::from(6));
        let sink = RecordingSink::default();
        let ledger = BalanceLedger::new(&store, &sink);

        let created = ledger.provision(TenantId(1), &emp, 2026).await.unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].leave_type_id, 3);
        // 168 h for an 8 h day scales to 126 h for a 6 h day
        assert_eq!(created[0].total_hours, Decimal::from(126));
    }

    #[actix_web::test]
    async fn provision_leaves_existing_rows_alone() {
        let store = seeded().await;
        store.put_balance(balance_with(40, 8, 0)).await;
        let sink = RecordingSink::default();
        let ledger = BalanceLedger::new(&store, &sink);

        let created = ledger
            .provision(TenantId(1), &employee(10), 2026)
            .await
            .unwrap();

        assert!(created.is_empty());
        let stored = store.balance(&key(2026)).await.unwrap();
        assert_eq!(stored.total_hours, Decimal::from(40));
    }

    #[test]
    fn entitlement_scales_from_eight_hour_day() {
        assert_eq!(
            scaled_entitlement(Decimal::from(168), Decimal::new(75, 1)),
            Decimal::new(1575, 1)
        );
        assert_eq!(
            scaled_entitlement(Decimal::from(100), Decimal::from(7)),
            Decimal::new(8750, 2)
        );
    }
}
