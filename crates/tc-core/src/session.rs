//! Attendance sessions as supplied by the storage layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::TimeOfDay;
use crate::date::parse_date;
use crate::types::{EmployeeId, ParseError};

/// One entry/exit pair for an employee on a given date.
///
/// Fields are kept as the raw strings the writer produced. Parsing happens
/// on demand so that a bad row degrades a single result instead of failing
/// the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSession {
    pub employee_id: EmployeeId,
    /// Calendar date, in any format of the date fallback chain.
    pub date: String,
    /// Entry time, `HH:mm` or `HH:mm:ss`.
    pub entry_time: String,
    /// Exit time. Absent or blank while the session is open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<String>,
}

impl AttendanceSession {
    /// Creates an open session.
    pub fn open(
        employee_id: EmployeeId,
        date: impl Into<String>,
        entry_time: impl Into<String>,
    ) -> Self {
        Self {
            employee_id,
            date: date.into(),
            entry_time: entry_time.into(),
            exit_time: None,
        }
    }

    /// Creates a closed session.
    pub fn closed(
        employee_id: EmployeeId,
        date: impl Into<String>,
        entry_time: impl Into<String>,
        exit_time: impl Into<String>,
    ) -> Self {
        Self {
            employee_id,
            date: date.into(),
            entry_time: entry_time.into(),
            exit_time: Some(exit_time.into()),
        }
    }

    /// Exit time, with blank strings treated as absent.
    pub fn exit(&self) -> Option<&str> {
        self.exit_time
            .as_deref()
            .map(str::trim)
            .filter(|exit| !exit.is_empty())
    }

    /// Whether the employee clocked in but has not clocked out.
    pub fn is_open(&self) -> bool {
        self.exit().is_none()
    }

    /// The normalized calendar date.
    pub fn calendar_date(&self) -> Result<NaiveDate, ParseError> {
        parse_date(&self.date)
    }

    pub fn entry(&self) -> Result<TimeOfDay, ParseError> {
        TimeOfDay::parse(&self.entry_time)
    }
}
