//! Shared utilities for CLI commands.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tc_core::{AttendanceSession, Employee, EmployeeId, TimeOfDay, parse_date};
use tc_db::{Database, SessionRecord};

/// Parses an employee ID argument.
pub fn employee_id(raw: &str) -> Result<EmployeeId> {
    EmployeeId::new(raw).context("invalid employee ID")
}

/// Parses a `--date` argument with the date fallback chain, defaulting to today.
pub fn resolve_date(raw: Option<&str>) -> Result<NaiveDate> {
    raw.map_or_else(
        || Ok(Local::now().date_naive()),
        |raw| parse_date(raw).context("invalid --date"),
    )
}

/// Parses a `--time` argument, defaulting to the current local time.
pub fn resolve_time(raw: Option<&str>) -> Result<TimeOfDay> {
    raw.map_or_else(
        || Ok(TimeOfDay::from_naive(Local::now().time())),
        |raw| TimeOfDay::parse(raw).context("invalid --time"),
    )
}

/// Looks up an employee, failing if they are not registered.
pub fn require_employee(db: &Database, id: &EmployeeId) -> Result<Employee> {
    db.get_employee(id)?
        .with_context(|| format!("employee not found: {id}"))
}

/// Drops row IDs for aggregation.
pub fn into_sessions(records: Vec<SessionRecord>) -> Vec<AttendanceSession> {
    records.into_iter().map(|record| record.session).collect()
}
