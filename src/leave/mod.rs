//! Leave balance and accrual engine.

pub mod accrual;
pub mod calendar;
pub mod duration;
pub mod holiday;
pub mod ledger;
pub mod notify;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;
