//! Core domain logic for timecard.
//!
//! This crate contains the fundamental types and logic for:
//! - Aggregation: session durations, per-day totals and period summaries
//! - Parsing: `HH:mm` times and the calendar date fallback chain
//! - Directory: employees, departments and roles
//!
//! Nothing here performs I/O.

mod aggregate;
pub mod clock;
pub mod date;
pub mod employee;
pub mod period;
pub mod session;
pub mod types;

pub use aggregate::{
    Aggregator, AggregatorConfig, DayTotal, OvernightPolicy, PeriodSummary, can_register_entry,
    can_register_exit, group_by_date, has_open_session,
};
pub use clock::{TimeOfDay, format_hhmm};
pub use date::{canonical_date, display_date, parse_date};
pub use employee::{Department, Employee};
pub use period::Period;
pub use session::AttendanceSession;
pub use types::{EmployeeId, ParseError, Role, ValidationError};
