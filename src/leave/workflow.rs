//! Leave request lifecycle.
//!
//! ```text
//! create ─┬─> Pending ──approve──> Approved ──cancel (before start)──> Cancelled
//!         │      ├──reject──> Rejected
//!         │      └──cancel──> Cancelled
//!         └─> Approved   (leave type without approval)
//! ```
//!
//! Every transition reads reference data first, then performs all row locks,
//! ledger ops and request writes inside a single store transaction.
//! Notifications go out only after the commit.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;

use super::duration::{DurationCalculator, LeaveSpan, resolve_country_code};
use super::holiday::HolidayCalendar;
use super::ledger::{self, BalanceLedger};
use super::notify::{NotificationSink, deliver};
use crate::error::LeaveError;
use crate::model::leave_balance::{BalanceKey, LedgerOp};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, NewLeaveRequest};
use crate::model::notification::{Notification, NotificationKind};
use crate::model::tenant::TenantId;
use crate::store::{LeaveStore, LeaveTx};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 3)]
    pub leave_type_id: u64,
    #[schema(example = "2026-03-02", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-03-06", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[serde(default = "full_day")]
    pub is_full_day: bool,
    /// Required when `is_full_day` is false
    #[schema(value_type = Option<String>, example = "4")]
    pub leave_hours: Option<Decimal>,
    #[schema(example = "Family trip")]
    pub reason: Option<String>,
    /// Reference to an already uploaded document
    pub attachment_path: Option<String>,
    pub attachment_file_name: Option<String>,
}

fn full_day() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Decision {
    pub approve: bool,
    #[schema(example = "Enjoy your trip")]
    pub comments: Option<String>,
}

pub struct LeaveWorkflow<S, H, N> {
    store: S,
    holidays: H,
    notifier: N,
}

impl<S, H, N> LeaveWorkflow<S, H, N>
where
    S: LeaveStore,
    H: HolidayCalendar,
    N: NotificationSink,
{
    pub fn new(store: S, holidays: H, notifier: N) -> Self {
        Self {
            store,
            holidays,
            notifier,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn holidays(&self) -> &H {
        &self.holidays
    }

    pub fn ledger(&self) -> BalanceLedger<'_, S, N> {
        BalanceLedger::new(&self.store, &self.notifier)
    }

    /// Files a request for `employee_id` and reserves its hours.
    ///
    /// Leave types that need no approval are approved on the spot, which
    /// commits the reservation in the same transaction.
    #[instrument(
        skip(self, input, now),
        fields(tenant = %tenant, leave_type_id = input.leave_type_id)
    )]
    pub async fn create(
        &self,
        tenant: TenantId,
        employee_id: u64,
        input: CreateLeave,
        now: DateTime<Utc>,
    ) -> Result<LeaveRequest, LeaveError> {
        let employee = self
            .store
            .employee(tenant, employee_id)
            .await?
            .filter(|e| e.is_active)
            .ok_or_else(|| LeaveError::not_found("Employee"))?;
        let leave_type = self
            .store
            .leave_type(tenant, input.leave_type_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| LeaveError::not_found("Leave type"))?;
        if !leave_type.available_to(&employee) {
            return Err(LeaveError::validation(format!(
                "{} leave is not available to this employee",
                leave_type.name
            )));
        }

        let settings = self.store.company_settings(tenant).await?;
        let country_code = resolve_country_code(&employee, settings.as_ref());
        let country = self.store.country_workday(&country_code).await?;

        let span = LeaveSpan {
            start_date: input.start_date,
            end_date: input.end_date,
            is_full_day: input.is_full_day,
            leave_hours: input.leave_hours,
        };
        let duration = DurationCalculator::new(&self.holidays)
            .compute(tenant, &span, &employee, settings.as_ref(), country.as_ref())
            .await?;

        let auto_approve = !leave_type.requires_approval;
        let key = BalanceKey {
            tenant_id: tenant,
            employee_id,
            leave_type_id: leave_type.id,
            year: input.start_date.year(),
        };
        let hours = duration.leave_hours;

        let mut tx = self.store.begin().await?;
        ledger::apply(&mut tx, &key, &LedgerOp::Reserve(hours), now).await?;
        if auto_approve {
            ledger::apply(&mut tx, &key, &LedgerOp::Commit(hours), now).await?;
        }
        let request = tx
            .insert_request(NewLeaveRequest {
                tenant_id: tenant,
                employee_id,
                leave_type_id: leave_type.id,
                balance_year: key.year,
                start_date: input.start_date,
                end_date: input.end_date,
                is_full_day: input.is_full_day,
                leave_hours: hours,
                total_days: duration.total_days,
                status: if auto_approve {
                    LeaveStatus::Approved
                } else {
                    LeaveStatus::Pending
                },
                reason: input.reason,
                attachment_path: input.attachment_path,
                attachment_file_name: input.attachment_file_name,
                approved_at: auto_approve.then_some(now),
                created_at: now,
            })
            .await?;
        tx.commit().await?;

        tracing::info!(
            request_id = request.id,
            hours = %hours,
            status = %request.status,
            "Leave request created"
        );
        Ok(request)
    }

    /// Approves or rejects a pending request on behalf of `approver_id`.
    #[instrument(skip(self, decision, now), fields(tenant = %tenant, approve = decision.approve))]
    pub async fn decide(
        &self,
        tenant: TenantId,
        request_id: u64,
        approver_id: u64,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> Result<LeaveRequest, LeaveError> {
        let mut tx = self.store.begin().await?;
        let mut request = tx
            .lock_request(tenant, request_id)
            .await?
            .ok_or_else(|| LeaveError::not_found("Leave request"))?;

        if request.status != LeaveStatus::Pending {
            return Err(LeaveError::InvalidState {
                current: request.status,
                action: "decide",
            });
        }

        let (op, status) = if decision.approve {
            (LedgerOp::Commit(request.leave_hours), LeaveStatus::Approved)
        } else {
            (LedgerOp::Release(request.leave_hours), LeaveStatus::Rejected)
        };
        ledger::apply(&mut tx, &request.balance_key(), &op, now).await?;

        request.status = status;
        request.approver_id = Some(approver_id);
        request.approved_at = Some(now);
        request.approver_comments = decision.comments;
        request.updated_at = Some(now);
        tx.save_request(&request).await?;
        tx.commit().await?;

        tracing::info!(request_id, status = %request.status, hours = %request.leave_hours, "Leave request decided");

        let leave_type = self
            .store
            .leave_type(tenant, request.leave_type_id)
            .await
            .ok()
            .flatten()
            .map(|t| t.name)
            .unwrap_or_else(|| "leave".to_string());
        let (kind, verb) = if decision.approve {
            (NotificationKind::Success, "Approved")
        } else {
            (NotificationKind::Warning, "Rejected")
        };
        deliver(
            &self.notifier,
            Notification {
                tenant_id: tenant,
                user_id: request.employee_id,
                title: format!("Leave Request {verb}"),
                message: format!(
                    "Your {} leave request ({} days) has been {}.",
                    leave_type,
                    request.total_days,
                    verb.to_lowercase()
                ),
                kind,
                related_entity_id: Some(request.id),
            },
        )
        .await;

        Ok(request)
    }

    /// Withdraws a request owned by `requester_id`.
    ///
    /// Pending requests release their reservation. Approved requests may be
    /// cancelled only before `start_date` and refund the whole amount.
    #[instrument(skip(self), fields(tenant = %tenant))]
    pub async fn cancel(
        &self,
        tenant: TenantId,
        request_id: u64,
        requester_id: u64,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<LeaveRequest, LeaveError> {
        let mut tx = self.store.begin().await?;
        let mut request = tx
            .lock_request(tenant, request_id)
            .await?
            .ok_or_else(|| LeaveError::not_found("Leave request"))?;

        if request.employee_id != requester_id {
            return Err(LeaveError::Forbidden(
                "Only the requester can cancel a leave request".into(),
            ));
        }

        let op = match request.status {
            LeaveStatus::Pending => LedgerOp::Release(request.leave_hours),
            LeaveStatus::Approved if request.start_date > today => {
                LedgerOp::Refund(request.leave_hours)
            }
            current => {
                return Err(LeaveError::InvalidState {
                    current,
                    action: "cancel",
                });
            }
        };
        ledger::apply(&mut tx, &request.balance_key(), &op, now).await?;

        request.status = LeaveStatus::Cancelled;
        request.updated_at = Some(now);
        tx.save_request(&request).await?;
        tx.commit().await?;

        tracing::info!(request_id, ?op, "Leave request cancelled");
        Ok(request)
    }
}
