use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::calendar::WorkingCalendar;
use super::holiday::HolidayCalendar;
use crate::error::LeaveError;
use crate::model::employee::Employee;
use crate::model::leave_balance::check_hours;
use crate::model::settings::{
    CompanySettings, CountryWorkday, DEFAULT_COUNTRY_CODE, DEFAULT_DAILY_WORKING_HOURS,
};
use crate::model::tenant::TenantId;

/// The part of a leave request that determines its length.
#[derive(Debug, Clone)]
pub struct LeaveSpan {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_full_day: bool,
    /// Required for partial-day requests, ignored otherwise.
    pub leave_hours: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaveDuration {
    /// Billable hours at full precision.
    pub leave_hours: Decimal,
    /// Days for display, rounded to 2 dp.
    pub total_days: Decimal,
    /// Counted dates for full-day requests; zero for partial ones.
    pub working_days: u32,
}

pub fn resolve_daily_hours(employee: &Employee, settings: Option<&CompanySettings>) -> Decimal {
    employee
        .daily_working_hours
        .or_else(|| settings.map(|s| s.default_daily_working_hours))
        .unwrap_or(DEFAULT_DAILY_WORKING_HOURS)
}

pub fn resolve_country_code(employee: &Employee, settings: Option<&CompanySettings>) -> String {
    employee
        .country_code
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .or_else(|| settings.map(|s| s.default_country_code.as_str()))
        .unwrap_or(DEFAULT_COUNTRY_CODE)
        .to_uppercase()
}

/// Longest span a single request may cover, in calendar days.
pub const MAX_SPAN_DAYS: i64 = 366;

/// Hours to days, rounded for display.
pub fn hours_to_days(hours: Decimal, daily_hours: Decimal) -> Result<Decimal, LeaveError> {
    if daily_hours <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    hours
        .checked_div(daily_hours)
        .map(|days| days.round_dp(2))
        .ok_or_else(|| {
            LeaveError::Validation(format!(
                "{hours} hours cannot be expressed in days of {daily_hours} hours"
            ))
        })
}

/// Inclusive count of dates that are worked and not a public holiday.
pub fn count_working_days(
    start: NaiveDate,
    end: NaiveDate,
    calendar: &WorkingCalendar<'_>,
    holidays: &HashSet<NaiveDate>,
) -> u32 {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| calendar.is_working_day(*d) && !holidays.contains(d))
        .count() as u32
}

pub struct DurationCalculator<'h, H: ?Sized> {
    holidays: &'h H,
}

impl<'h, H: HolidayCalendar + ?Sized> DurationCalculator<'h, H> {
    pub fn new(holidays: &'h H) -> Self {
        Self { holidays }
    }

    /// Converts a span into billable hours and display days.
    ///
    /// Full-day spans count working days between the dates (inclusive),
    /// skipping public holidays of every year the span touches. Partial
    /// spans take the hours as given and must meet the company minimum.
    pub async fn compute(
        &self,
        tenant: TenantId,
        span: &LeaveSpan,
        employee: &Employee,
        settings: Option<&CompanySettings>,
        country: Option<&CountryWorkday>,
    ) -> Result<LeaveDuration, LeaveError> {
        if span.start_date > span.end_date {
            return Err(LeaveError::validation("start_date cannot be after end_date"));
        }
        if (span.end_date - span.start_date).num_days() >= MAX_SPAN_DAYS {
            return Err(LeaveError::Validation(format!(
                "A leave request cannot cover more than {MAX_SPAN_DAYS} days"
            )));
        }

        let daily_hours = resolve_daily_hours(employee, settings);
        if daily_hours <= Decimal::ZERO {
            return Err(LeaveError::validation(
                "Daily working hours must be greater than zero",
            ));
        }

        if !span.is_full_day {
            return partial_day(span, daily_hours, settings);
        }

        let country_code = resolve_country_code(employee, settings);
        let mut holidays = HashSet::new();
        for year in span.start_date.year()..=span.end_date.year() {
            let set = self.holidays.holidays(tenant, &country_code, year).await?;
            holidays.extend(set.iter().copied());
        }

        let calendar = WorkingCalendar::for_employee(employee, country, settings);
        let working_days = count_working_days(span.start_date, span.end_date, &calendar, &holidays);
        if working_days == 0 {
            return Err(LeaveError::validation(
                "Selected dates contain no working days",
            ));
        }

        let days = Decimal::from(working_days);
        Ok(LeaveDuration {
            leave_hours: days * daily_hours,
            total_days: days,
            working_days,
        })
    }
}

fn partial_day(
    span: &LeaveSpan,
    daily_hours: Decimal,
    settings: Option<&CompanySettings>,
) -> Result<LeaveDuration, LeaveError> {
    let hours = span
        .leave_hours
        .ok_or_else(|| LeaveError::validation("leave_hours is required for partial-day leave"))?;

    if hours <= Decimal::ZERO {
        return Err(LeaveError::validation("leave_hours must be greater than zero"));
    }
    check_hours("leave_hours", hours)?;
    let calendar_days = (span.end_date - span.start_date).num_days() + 1;
    if hours > Decimal::from(24 * calendar_days) {
        return Err(LeaveError::validation(
            "leave_hours cannot exceed 24 hours per calendar day",
        ));
    }
    if let Some(min) = settings.map(|s| s.min_leave_hours) {
        if hours < min {
            return Err(LeaveError::Validation(format!(
                "Minimum leave is {min} hours"
            )));
        }
    }

    Ok(LeaveDuration {
        leave_hours: hours,
        total_days: hours_to_days(hours, daily_hours)?,
        working_days: 0,
    })
}
