//! Calendar date parsing with a format fallback chain.
//!
//! Dates reach the aggregator from several writers that never agreed on a
//! format: `01/05/2024`, `2024-05-01` and full ISO timestamps all occur. Each
//! [`DateFormat`] is one parsing strategy; [`FALLBACK_CHAIN`] fixes the order in
//! which they are tried. New data should be written with [`canonical_date`],
//! at which point the chain only has to handle legacy rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::types::ParseError;

/// A date layout accepted by [`parse_date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `dd/MM/yyyy`
    DayMonthYear,
    /// `yyyy-MM-dd`
    IsoDate,
    /// RFC 3339 or naive `yyyy-MM-ddTHH:mm[:ss]` / `yyyy-MM-dd HH:mm[:ss]`.
    IsoDateTime,
    /// `dd-MM-yyyy`
    DayMonthYearDashed,
    /// `MM/dd/yyyy`
    MonthDayYear,
}

/// Formats tried in order; the first successful parse wins.
///
/// `dd/MM/yyyy` precedes `MM/dd/yyyy`, so an ambiguous `01/05/2024` is the
/// first of May.
pub const FALLBACK_CHAIN: [DateFormat; 5] = [
    DateFormat::DayMonthYear,
    DateFormat::IsoDate,
    DateFormat::IsoDateTime,
    DateFormat::DayMonthYearDashed,
    DateFormat::MonthDayYear,
];

const NAIVE_DATETIME_PATTERNS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

impl DateFormat {
    /// Human-readable pattern, used in diagnostics.
    pub const fn pattern(self) -> &'static str {
        match self {
            Self::DayMonthYear => "dd/MM/yyyy",
            Self::IsoDate => "yyyy-MM-dd",
            Self::IsoDateTime => "ISO-8601 date-time",
            Self::DayMonthYearDashed => "dd-MM-yyyy",
            Self::MonthDayYear => "MM/dd/yyyy",
        }
    }

    /// Attempts to parse `input` with this format only.
    pub fn parse(self, input: &str) -> Option<NaiveDate> {
        match self {
            Self::DayMonthYear => NaiveDate::parse_from_str(input, "%d/%m/%Y").ok(),
            Self::IsoDate => NaiveDate::parse_from_str(input, "%Y-%m-%d").ok(),
            Self::IsoDateTime => parse_iso_datetime(input),
            Self::DayMonthYearDashed => NaiveDate::parse_from_str(input, "%d-%m-%Y").ok(),
            Self::MonthDayYear => NaiveDate::parse_from_str(input, "%m/%d/%Y").ok(),
        }
    }
}

fn parse_iso_datetime(input: &str) -> Option<NaiveDate> {
    // The calendar date as written, not converted to any other zone.
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.date_naive());
    }
    NAIVE_DATETIME_PATTERNS
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(input, pattern).ok())
        .map(|dt| dt.date())
}

/// Runs the fallback chain and reports which format matched.
pub fn resolve(input: &str) -> Option<(DateFormat, NaiveDate)> {
    let trimmed = input.trim();
    FALLBACK_CHAIN
        .iter()
        .find_map(|format| format.parse(trimmed).map(|date| (*format, date)))
}

/// Parses a calendar date using [`FALLBACK_CHAIN`].
pub fn parse_date(input: &str) -> Result<NaiveDate, ParseError> {
    match resolve(input) {
        Some((DateFormat::IsoDate, date)) => Ok(date),
        Some((format, date)) => {
            tracing::trace!(
                input,
                format = format.pattern(),
                "non-canonical date format"
            );
            Ok(date)
        }
        None => Err(ParseError::Date {
            input: input.to_string(),
        }),
    }
}

/// Storage form, `yyyy-MM-dd`. Sorts lexicographically in calendar order.
pub fn canonical_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Display form, `dd/MM/yyyy`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
