//! Persistence seam for the leave engine.
//!
//! Reference data is read straight from [`LeaveStore`]. Every state
//! transition runs inside one [`LeaveTx`]: rows are locked as they are read,
//! and nothing is visible to other callers until [`LeaveTx::commit`].
//! Dropping a transaction without committing discards all of its writes.

#[cfg(test)]
pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::LeaveError;
use crate::model::employee::Employee;
use crate::model::leave_balance::{BalanceKey, LeaveBalance};
use crate::model::leave_request::{LeaveRequest, NewLeaveRequest};
use crate::model::leave_type::LeaveType;
use crate::model::settings::{CompanySettings, CountryWorkday};
use crate::model::tenant::TenantId;

#[async_trait]
pub trait LeaveStore: Send + Sync {
    type Tx: LeaveTx;

    async fn begin(&self) -> Result<Self::Tx, LeaveError>;

    async fn employee(&self, tenant: TenantId, id: u64) -> Result<Option<Employee>, LeaveError>;

    async fn leave_type(&self, tenant: TenantId, id: u64) -> Result<Option<LeaveType>, LeaveError>;

    async fn active_leave_types(&self, tenant: TenantId) -> Result<Vec<LeaveType>, LeaveError>;

    async fn company_settings(
        &self,
        tenant: TenantId,
    ) -> Result<Option<CompanySettings>, LeaveError>;

    async fn country_workday(&self, country_code: &str)
    -> Result<Option<CountryWorkday>, LeaveError>;

    async fn leave_request(
        &self,
        tenant: TenantId,
        id: u64,
    ) -> Result<Option<LeaveRequest>, LeaveError>;

    async fn balances(
        &self,
        tenant: TenantId,
        employee_id: u64,
        year: i32,
    ) -> Result<Vec<LeaveBalance>, LeaveError>;
}

/// One atomic unit of work. Lock order: request row first, then balance row.
#[async_trait]
pub trait LeaveTx: Send {
    async fn lock_request(
        &mut self,
        tenant: TenantId,
        id: u64,
    ) -> Result<Option<LeaveRequest>, LeaveError>;

    async fn insert_request(&mut self, request: NewLeaveRequest)
    -> Result<LeaveRequest, LeaveError>;

    async fn save_request(&mut self, request: &LeaveRequest) -> Result<(), LeaveError>;

    async fn lock_balance(&mut self, key: &BalanceKey) -> Result<Option<LeaveBalance>, LeaveError>;

    async fn insert_balance(
        &mut self,
        key: &BalanceKey,
        total_hours: Decimal,
        note: Option<String>,
    ) -> Result<LeaveBalance, LeaveError>;

    async fn save_balance(&mut self, balance: &LeaveBalance) -> Result<(), LeaveError>;

    async fn commit(self) -> Result<(), LeaveError>;
}
