//! Time-of-day parsing and `HH:mm` rendering.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};

use crate::types::ParseError;

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// A wall-clock time with minute precision.
///
/// Seconds are accepted on input but dropped, so `09:00:59` and `09:00`
/// compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    /// Parses `H:mm`, `HH:mm` or `HH:mm:ss`.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = input.trim().split(':').collect();
        if !(2..=3).contains(&fields.len()) {
            return Err(ParseError::TimeFields {
                input: input.to_string(),
            });
        }

        let hour = parse_component(input, fields[0], "hour", 23)?;
        let minute = parse_component(input, fields[1], "minute", 59)?;
        if let Some(second) = fields.get(2) {
            parse_component(input, second, "second", 59)?;
        }

        Ok(Self {
            minutes: hour * 60 + minute,
        })
    }

    /// Builds a time from hour and minute, `None` when out of range.
    pub const fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self {
            minutes: hour * 60 + minute,
        })
    }

    /// Truncates a `chrono` time to minute precision.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "hour and minute of a NaiveTime always fit in u16"
    )]
    pub fn from_naive(time: NaiveTime) -> Self {
        Self {
            minutes: (time.hour() * 60 + time.minute()) as u16,
        }
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> i64 {
        i64::from(self.minutes)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_component(
    input: &str,
    field: &str,
    component: &'static str,
    max: u16,
) -> Result<u16, ParseError> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::TimeComponent {
            input: input.to_string(),
            component,
        });
    }
    // All digits, so the only possible failure is overflow.
    let value: u16 = field.parse().map_err(|_| ParseError::TimeOutOfRange {
        input: input.to_string(),
        component,
    })?;
    if value > max {
        return Err(ParseError::TimeOutOfRange {
            input: input.to_string(),
            component,
        });
    }
    Ok(value)
}

/// Formats a minute count as `HH:mm`.
///
/// Hours are not wrapped at 24, so a week total renders as e.g. `41:30`.
/// Negative counts get a leading `-`.
pub fn format_hhmm(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let abs = minutes.unsigned_abs();
    format!("{sign}{:02}:{:02}", abs / 60, abs % 60)
}
