//! Fixtures shared by the leave engine tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::holiday::{HolidayCalendar, HolidaySet};
use super::notify::NotificationSink;
use crate::error::LeaveError;
use crate::model::employee::{Employee, Gender};
use crate::model::leave_type::{ApplicableGender, LeaveType};
use crate::model::notification::Notification;
use crate::model::role::Role;
use crate::model::settings::{CompanySettings, CountryWorkday, WeekPattern};
use crate::model::tenant::TenantId;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn employee(id: u64) -> Employee {
    Employee {
        id,
        tenant_id: TenantId(1),
        email: format!("emp{id}@company.com"),
        first_name: "Test".into(),
        last_name: format!("Employee{id}"),
        role_id: Role::Employee.id(),
        gender: Gender::Male,
        manager_id: None,
        daily_working_hours: None,
        country_code: None,
        working_days: None,
        is_active: true,
    }
}

pub fn approver(id: u64) -> Employee {
    Employee {
        role_id: Role::Approver.id(),
        ..employee(id)
    }
}

pub fn leave_type(id: u64, requires_approval: bool) -> LeaveType {
    LeaveType {
        id,
        tenant_id: TenantId(1),
        name: format!("Type {id}"),
        description: None,
        default_hours_per_year: Decimal::from(168),
        requires_approval,
        requires_document: false,
        applicable_gender: ApplicableGender::All,
        color_code: "#3B82F6".into(),
        is_active: true,
    }
}

pub fn settings(tenant: u64) -> CompanySettings {
    CompanySettings::new(TenantId(tenant))
}

pub fn country(code: &str, week: WeekPattern) -> CountryWorkday {
    CountryWorkday {
        country_code: code.into(),
        week,
    }
}

/// Fixed holiday table that records which (country, year) pairs were asked for.
#[derive(Default)]
pub struct StaticHolidays {
    dates: HashMap<String, HashSet<NaiveDate>>,
    requests: Mutex<Vec<(String, i32)>>,
}

impl StaticHolidays {
    pub fn with(mut self, country: &str, day: NaiveDate) -> Self {
        self.dates.entry(country.to_uppercase()).or_default().insert(day);
        self
    }

    pub fn years_requested(&self) -> Vec<i32> {
        self.requests.lock().unwrap().iter().map(|(_, y)| *y).collect()
    }

    pub fn countries_requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }
}

#[async_trait]
impl HolidayCalendar for StaticHolidays {
    async fn holidays(
        &self,
        _tenant: TenantId,
        country_code: &str,
        year: i32,
    ) -> Result<HolidaySet, LeaveError> {
        self.requests
            .lock()
            .unwrap()
            .push((country_code.to_string(), year));
        let set = self
            .dates
            .get(country_code)
            .map(|days| days.iter().copied().filter(|d| d.year() == year).collect())
            .unwrap_or_default();
        Ok(Arc::new(set))
    }
}

pub struct UnavailableHolidays;

#[async_trait]
impl HolidayCalendar for UnavailableHolidays {
    async fn holidays(
        &self,
        _tenant: TenantId,
        country_code: &str,
        _year: i32,
    ) -> Result<HolidaySet, LeaveError> {
        Err(LeaveError::DependencyUnavailable(format!(
            "holiday service down for {country_code}"
        )))
    }
}

#[derive(Default, Clone)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, notification: Notification) -> Result<(), LeaveError> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

pub struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    async fn notify(&self, _notification: Notification) -> Result<(), LeaveError> {
        Err(LeaveError::DependencyUnavailable("mail relay".into()))
    }
}
