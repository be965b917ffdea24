//! In-process store for tests. A transaction holds the store-wide lock for
//! its whole lifetime and writes a working copy back only on commit, so
//! transactions are serialized and aborted ones leave no trace.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::lock::{Mutex, OwnedMutexGuard};
use rust_decimal::Decimal;

use super::{LeaveStore, LeaveTx};
use crate::error::LeaveError;
use crate::model::employee::Employee;
use crate::model::leave_balance::{BalanceKey, LeaveBalance};
use crate::model::leave_request::{LeaveRequest, NewLeaveRequest};
use crate::model::leave_type::LeaveType;
use crate::model::settings::{CompanySettings, CountryWorkday};
use crate::model::tenant::TenantId;

#[derive(Debug, Clone, Default)]
struct State {
    employees: HashMap<(TenantId, u64), Employee>,
    leave_types: HashMap<(TenantId, u64), LeaveType>,
    settings: HashMap<TenantId, CompanySettings>,
    countries: HashMap<String, CountryWorkday>,
    requests: HashMap<(TenantId, u64), LeaveRequest>,
    balances: HashMap<BalanceKey, LeaveBalance>,
    /// Row another writer commits just before the next balance insert.
    racing_insert: Option<LeaveBalance>,
    next_id: u64,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<State>,
    working: State,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_employee(&self, employee: Employee) {
        let mut state = self.state.lock().await;
        state
            .employees
            .insert((employee.tenant_id, employee.id), employee);
    }

    pub async fn put_leave_type(&self, leave_type: LeaveType) {
        let mut state = self.state.lock().await;
        state
            .leave_types
            .insert((leave_type.tenant_id, leave_type.id), leave_type);
    }

    pub async fn put_settings(&self, settings: CompanySettings) {
        let mut state = self.state.lock().await;
        state.settings.insert(settings.tenant_id, settings);
    }

    pub async fn put_country(&self, workday: CountryWorkday) {
        let mut state = self.state.lock().await;
        state
            .countries
            .insert(workday.country_code.to_uppercase(), workday);
    }

    pub async fn put_balance(&self, balance: LeaveBalance) {
        let mut state = self.state.lock().await;
        state.balances.insert(balance.key(), balance);
    }

    /// Makes the next `insert_balance` lose a unique-key race to `rival`.
    pub async fn race_next_balance_insert(&self, rival: LeaveBalance) {
        self.state.lock().await.racing_insert = Some(rival);
    }

    pub async fn balance(&self, key: &BalanceKey) -> Option<LeaveBalance> {
        self.state.lock().await.balances.get(key).cloned()
    }

    pub async fn request_count(&self) -> usize {
        self.state.lock().await.requests.len()
    }
}

#[async_trait]
impl LeaveStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, LeaveError> {
        let guard = self.state.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(MemoryTx { guard, working })
    }

    async fn employee(&self, tenant: TenantId, id: u64) -> Result<Option<Employee>, LeaveError> {
        Ok(self.state.lock().await.employees.get(&(tenant, id)).cloned())
    }

    async fn leave_type(&self, tenant: TenantId, id: u64) -> Result<Option<LeaveType>, LeaveError> {
        Ok(self.state.lock().await.leave_types.get(&(tenant, id)).cloned())
    }

    async fn active_leave_types(&self, tenant: TenantId) -> Result<Vec<LeaveType>, LeaveError> {
        let state = self.state.lock().await;
        let mut types: Vec<LeaveType> = state
            .leave_types
            .values()
            .filter(|t| t.tenant_id == tenant && t.is_active)
            .cloned()
            .collect();
        types.sort_by_key(|t| t.id);
        Ok(types)
    }

    async fn company_settings(
        &self,
        tenant: TenantId,
    ) -> Result<Option<CompanySettings>, LeaveError> {
        Ok(self.state.lock().await.settings.get(&tenant).cloned())
    }

    async fn country_workday(
        &self,
        country_code: &str,
    ) -> Result<Option<CountryWorkday>, LeaveError> {
        let state = self.state.lock().await;
        Ok(state.countries.get(&country_code.to_uppercase()).cloned())
    }

    async fn leave_request(
        &self,
        tenant: TenantId,
        id: u64,
    ) -> Result<Option<LeaveRequest>, LeaveError> {
        Ok(self.state.lock().await.requests.get(&(tenant, id)).cloned())
    }

    async fn balances(
        &self,
        tenant: TenantId,
        employee_id: u64,
        year: i32,
    ) -> Result<Vec<LeaveBalance>, LeaveError> {
        let state = self.state.lock().await;
        let mut balances: Vec<LeaveBalance> = state
            .balances
            .values()
            .filter(|b| b.tenant_id == tenant && b.employee_id == employee_id && b.year == year)
            .cloned()
            .collect();
        balances.sort_by_key(|b| b.leave_type_id);
        Ok(balances)
    }
}

#[async_trait]
impl LeaveTx for MemoryTx {
    async fn lock_request(
        &mut self,
        tenant: TenantId,
        id: u64,
    ) -> Result<Option<LeaveRequest>, LeaveError> {
        Ok(self.working.requests.get(&(tenant, id)).cloned())
    }

    async fn insert_request(
        &mut self,
        request: NewLeaveRequest,
    ) -> Result<LeaveRequest, LeaveError> {
        let id = self.working.next_id();
        let request = request.into_request(id);
        self.working
            .requests
            .insert((request.tenant_id, id), request.clone());
        Ok(request)
    }

    async fn save_request(&mut self, request: &LeaveRequest) -> Result<(), LeaveError> {
        self.working
            .requests
            .insert((request.tenant_id, request.id), request.clone());
        Ok(())
    }

    async fn lock_balance(&mut self, key: &BalanceKey) -> Result<Option<LeaveBalance>, LeaveError> {
        Ok(self.working.balances.get(key).cloned())
    }

    async fn insert_balance(
        &mut self,
        key: &BalanceKey,
        total_hours: Decimal,
        note: Option<String>,
    ) -> Result<LeaveBalance, LeaveError> {
        if let Some(rival) = self.guard.racing_insert.take() {
            self.guard.balances.insert(rival.key(), rival);
            return Err(LeaveError::Conflict("Duplicate entry for leave_balances".into()));
        }
        let balance = LeaveBalance {
            id: self.working.next_id(),
            tenant_id: key.tenant_id,
            employee_id: key.employee_id,
            leave_type_id: key.leave_type_id,
            year: key.year,
            total_hours,
            used_hours: Decimal::ZERO,
            pending_hours: Decimal::ZERO,
            note,
            updated_at: None,
        };
        self.working.balances.insert(*key, balance.clone());
        Ok(balance)
    }

    async fn save_balance(&mut self, balance: &LeaveBalance) -> Result<(), LeaveError> {
        self.working.balances.insert(balance.key(), balance.clone());
        Ok(())
    }

    async fn commit(self) -> Result<(), LeaveError> {
        let MemoryTx { mut guard, working } = self;
        *guard = working;
        Ok(())
    }
}
