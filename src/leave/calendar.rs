//! Weekly working-pattern resolution.
//!
//! A date's weekday is checked against a chain of resolvers, most specific
//! first: the employee's own bitmask, then the country calendar, then the
//! company default, then a Monday–Friday fallback. The first resolver that
//! has an opinion decides. Public holidays are not considered here.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::model::employee::{Employee, weekday_bit};
use crate::model::settings::{CompanySettings, CountryWorkday, WeekPattern};

/// One link of the resolution chain. `None` means "not configured here".
pub trait DayResolver {
    fn resolve(&self, day: Weekday) -> Option<bool>;
}

/// Employee-level override (Mon=1 … Sun=64).
pub struct EmployeeMask(pub Option<u8>);

impl DayResolver for EmployeeMask {
    fn resolve(&self, day: Weekday) -> Option<bool> {
        self.0.map(|mask| mask & weekday_bit(day) != 0)
    }
}

/// A country or company weekly pattern, when a row exists.
pub struct PatternResolver<'a>(pub Option<&'a WeekPattern>);

impl DayResolver for PatternResolver<'_> {
    fn resolve(&self, day: Weekday) -> Option<bool> {
        self.0.map(|week| week.works_on(day))
    }
}

pub struct StandardWeek;

impl DayResolver for StandardWeek {
    fn resolve(&self, day: Weekday) -> Option<bool> {
        Some(WeekPattern::MONDAY_TO_FRIDAY.works_on(day))
    }
}

pub struct WorkingCalendar<'a> {
    resolvers: Vec<Box<dyn DayResolver + 'a>>,
}

impl<'a> WorkingCalendar<'a> {
    pub fn new(resolvers: Vec<Box<dyn DayResolver + 'a>>) -> Self {
        Self { resolvers }
    }

    pub fn for_employee(
        employee: &Employee,
        country: Option<&'a CountryWorkday>,
        company: Option<&'a CompanySettings>,
    ) -> Self {
        Self::new(vec![
            Box::new(EmployeeMask(employee.working_days)),
            Box::new(PatternResolver(country.map(|c| &c.week))),
            Box::new(PatternResolver(company.map(|c| &c.week))),
            Box::new(StandardWeek),
        ])
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        let day = date.weekday();
        self.resolvers
            .iter()
            .find_map(|r| r.resolve(day))
            .unwrap_or(false)
    }
}

pub fn is_working_day(
    date: NaiveDate,
    employee: &Employee,
    country: Option<&CountryWorkday>,
    company: Option<&CompanySettings>,
) -> bool {
    WorkingCalendar::for_employee(employee, country, company).is_working_day(date)
}
