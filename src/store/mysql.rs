use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, Transaction};

use super::{LeaveStore, LeaveTx};
use crate::error::LeaveError;
use crate::model::employee::Employee;
use crate::model::leave_balance::{BalanceKey, LeaveBalance};
use crate::model::leave_request::{LeaveRequest, NewLeaveRequest};
use crate::model::leave_type::LeaveType;
use crate::model::settings::{CompanySettings, CountryWorkday};
use crate::model::tenant::TenantId;

pub(crate) const EMPLOYEE_COLUMNS: &str = "id, tenant_id, email, first_name, last_name, role_id, gender, \
     manager_id, daily_working_hours, country_code, working_days, is_active";

pub(crate) const LEAVE_TYPE_COLUMNS: &str = "id, tenant_id, name, description, default_hours_per_year, \
     requires_approval, requires_document, applicable_gender, color_code, is_active";

pub(crate) const LEAVE_REQUEST_COLUMNS: &str = "id, tenant_id, employee_id, leave_type_id, balance_year, \
     start_date, end_date, is_full_day, leave_hours, total_days, status, reason, attachment_path, \
     attachment_file_name, approver_id, approved_at, approver_comments, created_at, updated_at";

pub(crate) const BALANCE_COLUMNS: &str = "id, tenant_id, employee_id, leave_type_id, year, total_hours, \
     used_hours, pending_hours, note, updated_at";

pub(crate) const SETTINGS_COLUMNS: &str = "tenant_id, company_name, default_daily_working_hours, \
     min_leave_hours, default_country_code, monday, tuesday, wednesday, thursday, friday, saturday, \
     sunday, updated_at";

/// Duplicate keys and deadlocks on insert mean another transaction created
/// the same row first.
pub(crate) fn insert_conflict(err: sqlx::Error) -> LeaveError {
    match &err {
        sqlx::Error::Database(db)
            if db.is_unique_violation() || db.code().as_deref() == Some("40001") =>
        {
            LeaveError::Conflict(db.message().to_string())
        }
        _ => LeaveError::Database(err),
    }
}

/// MySQL-backed store. Transitions lock rows with `SELECT ... FOR UPDATE`.
#[derive(Clone)]
pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

pub struct MySqlLeaveTx {
    tx: Transaction<'static, MySql>,
}

#[async_trait]
impl LeaveStore for MySqlLeaveStore {
    type Tx = MySqlLeaveTx;

    async fn begin(&self) -> Result<MySqlLeaveTx, LeaveError> {
        Ok(MySqlLeaveTx {
            tx: self.pool.begin().await?,
        })
    }

    async fn employee(&self, tenant: TenantId, id: u64) -> Result<Option<Employee>, LeaveError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE tenant_id = ? AND id = ?");
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(tenant)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn leave_type(&self, tenant: TenantId, id: u64) -> Result<Option<LeaveType>, LeaveError> {
        let sql =
            format!("SELECT {LEAVE_TYPE_COLUMNS} FROM leave_types WHERE tenant_id = ? AND id = ?");
        let leave_type = sqlx::query_as::<_, LeaveType>(&sql)
            .bind(tenant)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(leave_type)
    }

    async fn active_leave_types(&self, tenant: TenantId) -> Result<Vec<LeaveType>, LeaveError> {
        let sql = format!(
            "SELECT {LEAVE_TYPE_COLUMNS} FROM leave_types WHERE tenant_id = ? AND is_active = TRUE ORDER BY name"
        );
        let types = sqlx::query_as::<_, LeaveType>(&sql)
            .bind(tenant)
            .fetch_all(&self.pool)
            .await?;
        Ok(types)
    }

    async fn company_settings(
        &self,
        tenant: TenantId,
    ) -> Result<Option<CompanySettings>, LeaveError> {
        let sql = format!("SELECT {SETTINGS_COLUMNS} FROM company_settings WHERE tenant_id = ?");
        let settings = sqlx::query_as::<_, CompanySettings>(&sql)
            .bind(tenant)
            .fetch_optional(&self.pool)
            .await?;
        Ok(settings)
    }

    async fn country_workday(
        &self,
        country_code: &str,
    ) -> Result<Option<CountryWorkday>, LeaveError> {
        let workday = sqlx::query_as::<_, CountryWorkday>(
            r#"
            SELECT country_code, monday, tuesday, wednesday, thursday, friday, saturday, sunday
            FROM country_workdays
            WHERE country_code = ?
            "#,
        )
        .bind(country_code.to_uppercase())
        .fetch_optional(&self.pool)
        .await?;
        Ok(workday)
    }

    async fn leave_request(
        &self,
        tenant: TenantId,
        id: u64,
    ) -> Result<Option<LeaveRequest>, LeaveError> {
        let sql = format!(
            "SELECT {LEAVE_REQUEST_COLUMNS} FROM leave_requests WHERE tenant_id = ? AND id = ?"
        );
        let request = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(tenant)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(request)
    }

    async fn balances(
        &self,
        tenant: TenantId,
        employee_id: u64,
        year: i32,
    ) -> Result<Vec<LeaveBalance>, LeaveError> {
        let sql = format!(
            "SELECT {BALANCE_COLUMNS} FROM leave_balances \
             WHERE tenant_id = ? AND employee_id = ? AND year = ? ORDER BY leave_type_id"
        );
        let balances = sqlx::query_as::<_, LeaveBalance>(&sql)
            .bind(tenant)
            .bind(employee_id)
            .bind(year)
            .fetch_all(&self.pool)
            .await?;
        Ok(balances)
    }
}

#[async_trait]
impl LeaveTx for MySqlLeaveTx {
    async fn lock_request(
        &mut self,
        tenant: TenantId,
        id: u64,
    ) -> Result<Option<LeaveRequest>, LeaveError> {
        let sql = format!(
            "SELECT {LEAVE_REQUEST_COLUMNS} FROM leave_requests WHERE tenant_id = ? AND id = ? FOR UPDATE"
        );
        let request = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(tenant)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(request)
    }

    async fn insert_request(
        &mut self,
        request: NewLeaveRequest,
    ) -> Result<LeaveRequest, LeaveError> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (tenant_id, employee_id, leave_type_id, balance_year, start_date, end_date,
                 is_full_day, leave_hours, total_days, status, reason, attachment_path,
                 attachment_file_name, approved_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.tenant_id)
        .bind(request.employee_id)
        .bind(request.leave_type_id)
        .bind(request.balance_year)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.is_full_day)
        .bind(request.leave_hours)
        .bind(request.total_days)
        .bind(request.status)
        .bind(&request.reason)
        .bind(&request.attachment_path)
        .bind(&request.attachment_file_name)
        .bind(request.approved_at)
        .bind(request.created_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(request.into_request(result.last_insert_id()))
    }

    async fn save_request(&mut self, request: &LeaveRequest) -> Result<(), LeaveError> {
        sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, approver_id = ?, approved_at = ?, approver_comments = ?, updated_at = ?
            WHERE tenant_id = ? AND id = ?
            "#,
        )
        .bind(request.status)
        .bind(request.approver_id)
        .bind(request.approved_at)
        .bind(&request.approver_comments)
        .bind(request.updated_at)
        .bind(request.tenant_id)
        .bind(request.id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn lock_balance(&mut self, key: &BalanceKey) -> Result<Option<LeaveBalance>, LeaveError> {
        let sql = format!(
            "SELECT {BALANCE_COLUMNS} FROM leave_balances \
             WHERE tenant_id = ? AND employee_id = ? AND leave_type_id = ? AND year = ? FOR UPDATE"
        );
        let balance = sqlx::query_as::<_, LeaveBalance>(&sql)
            .bind(key.tenant_id)
            .bind(key.employee_id)
            .bind(key.leave_type_id)
            .bind(key.year)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(balance)
    }

    async fn insert_balance(
        &mut self,
        key: &BalanceKey,
        total_hours: Decimal,
        note: Option<String>,
    ) -> Result<LeaveBalance, LeaveError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO leave_balances
                (tenant_id, employee_id, leave_type_id, year, total_hours, used_hours,
                 pending_hours, note, updated_at)
            VALUES (?, ?, ?, ?, ?, 0, 0, ?, ?)
            "#,
        )
        .bind(key.tenant_id)
        .bind(key.employee_id)
        .bind(key.leave_type_id)
        .bind(key.year)
        .bind(total_hours)
        .bind(&note)
        .bind(now)
        .execute(&mut *self.tx)
        .await
        .map_err(insert_conflict)?;

        Ok(LeaveBalance {
            id: result.last_insert_id(),
            tenant_id: key.tenant_id,
            employee_id: key.employee_id,
            leave_type_id: key.leave_type_id,
            year: key.year,
            total_hours,
            used_hours: Decimal::ZERO,
            pending_hours: Decimal::ZERO,
            note,
            updated_at: Some(now),
        })
    }

    async fn save_balance(&mut self, balance: &LeaveBalance) -> Result<(), LeaveError> {
        sqlx::query(
            r#"
            UPDATE leave_balances
            SET total_hours = ?, used_hours = ?, pending_hours = ?, note = ?, updated_at = ?
            WHERE id = ? AND tenant_id = ?
            "#,
        )
        .bind(balance.total_hours)
        .bind(balance.used_hours)
        .bind(balance.pending_hours)
        .bind(&balance.note)
        .bind(balance.updated_at)
        .bind(balance.id)
        .bind(balance.tenant_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self) -> Result<(), LeaveError> {
        self.tx.commit().await?;
        Ok(())
    }
}
