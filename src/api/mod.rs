pub mod employee;
pub mod holiday;
pub mod leave_balance;
pub mod leave_request;
pub mod leave_type;
pub mod notification;
pub mod settings;

use crate::leave::holiday::SqlHolidayCalendar;
use crate::leave::notify::SqlNotificationSink;
use crate::leave::workflow::LeaveWorkflow;
use crate::store::mysql::MySqlLeaveStore;

/// The workflow as wired into the HTTP server.
pub type AppWorkflow = LeaveWorkflow<MySqlLeaveStore, SqlHolidayCalendar, SqlNotificationSink>;
