//! Report period ranges.
//!
//! All ranges are inclusive calendar-date ranges, matching
//! [`Aggregator::summarize_period`](crate::Aggregator::summarize_period).

use chrono::{Datelike, Duration, NaiveDate};

/// Calendar period a report can cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
}

impl Period {
    /// The range of this period containing `reference`.
    pub fn range(self, reference: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Week => week_range(reference),
            Self::Month => month_range(reference),
        }
    }

    /// Lowercase name, as used in JSON reports.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// Monday through Sunday of the week containing `date`.
pub fn week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let days_since_monday = date.weekday().num_days_from_monday();
    let monday = date - Duration::days(i64::from(days_since_monday));
    (monday, monday + Duration::days(6))
}

/// First through last day of the month containing `date`.
pub fn month_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_month
        .and_then(|next| next.pred_opt())
        .unwrap_or(first);
    (first, last)
}
