//! Attendance aggregation.
//!
//! Derives worked time from a flat list of [`AttendanceSession`] records:
//!
//! 1. Per-session duration: exit minus entry, in minutes. Open sessions count 0.
//! 2. Per-day totals: sessions grouped by normalized calendar date.
//! 3. Period summary: per-day totals inside an inclusive date range, with
//!    days totalling `<= 0` minutes excluded from the worked-day count.
//!
//! # Recovery
//!
//! Bad rows never abort an aggregation. A session whose times do not parse
//! contributes 0 minutes, and a session whose date does not parse is left out
//! of every date-keyed view. Both cases emit a `tracing` warning.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::{MINUTES_PER_DAY, TimeOfDay};
use crate::session::AttendanceSession;
use crate::types::{EmployeeId, ParseError};

/// What to do with a closed session whose exit precedes its entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvernightPolicy {
    /// Keep the negative duration. Totals include it unless the caller filters.
    #[default]
    Negative,
    /// Count the session as 0 minutes.
    Clamp,
    /// Treat the exit as the next day's clock time (adds 24h).
    WrapMidnight,
}

impl OvernightPolicy {
    fn apply(self, minutes: i64) -> i64 {
        match self {
            Self::Negative => minutes,
            Self::Clamp => minutes.max(0),
            Self::WrapMidnight if minutes < 0 => minutes + MINUTES_PER_DAY,
            Self::WrapMidnight => minutes,
        }
    }
}

/// Configuration for aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Handling of exit-before-entry sessions. Default: [`OvernightPolicy::Negative`].
    #[serde(default)]
    pub overnight: OvernightPolicy,
}

/// Worked time for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayTotal {
    pub date: NaiveDate,
    /// Sum of session durations for the day.
    pub total_minutes: i64,
    pub session_count: usize,
    /// Sessions still waiting for an exit time.
    pub open_sessions: usize,
    /// Whether `total_minutes > 0`.
    pub worked: bool,
}

/// Aggregated worked-time statistics over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Sum over worked days only.
    pub total_minutes: i64,
    /// Distinct dates with a positive total.
    pub days_worked: u32,
    /// `total_minutes / days_worked`, truncated. `None` when no day was worked.
    pub average_minutes_per_day: Option<i64>,
    /// Every date in range that has at least one session, ascending.
    pub days: Vec<DayTotal>,
}

impl PeriodSummary {
    fn empty(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from,
            to,
            total_minutes: 0,
            days_worked: 0,
            average_minutes_per_day: None,
            days: Vec::new(),
        }
    }
}

/// Computes durations and summaries over attendance sessions.
///
/// Holds no state besides its configuration; every method is a pure
/// function of its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    config: AggregatorConfig,
}

impl Aggregator {
    pub const fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    /// Minutes between entry and exit, failing on malformed times.
    ///
    /// Open sessions return `Ok(0)` without looking at the entry time.
    pub fn try_session_duration(&self, session: &AttendanceSession) -> Result<i64, ParseError> {
        let Some(exit) = session.exit() else {
            return Ok(0);
        };
        let entry = session.entry()?;
        let exit = TimeOfDay::parse(exit)?;
        let minutes = exit.minutes() - entry.minutes();
        Ok(self.config.overnight.apply(minutes))
    }

    /// Minutes between entry and exit, 0 for open or malformed sessions.
    pub fn session_duration(&self, session: &AttendanceSession) -> i64 {
        match self.try_session_duration(session) {
            Ok(minutes) => minutes,
            Err(err) => {
                tracing::warn!(
                    employee_id = %session.employee_id,
                    date = %session.date,
                    error = %err,
                    "unparseable session time, counting 0 minutes"
                );
                0
            }
        }
    }

    /// Sum of [`Self::session_duration`] over all sessions.
    pub fn total_minutes<'a, I>(&self, sessions: I) -> i64
    where
        I: IntoIterator<Item = &'a AttendanceSession>,
    {
        sessions
            .into_iter()
            .map(|session| self.session_duration(session))
            .sum()
    }

    /// Minutes since entry for an open session, for "in progress" display.
    ///
    /// Never part of totals. `None` for closed sessions or a malformed entry.
    pub fn elapsed_minutes(&self, session: &AttendanceSession, now: TimeOfDay) -> Option<i64> {
        if !session.is_open() {
            return None;
        }
        match session.entry() {
            Ok(entry) => {
                let minutes = now.minutes() - entry.minutes();
                Some(self.config.overnight.apply(minutes))
            }
            Err(err) => {
                tracing::warn!(
                    employee_id = %session.employee_id,
                    error = %err,
                    "unparseable entry time on open session"
                );
                None
            }
        }
    }

    /// Totals for one day's sessions.
    pub fn day_total(&self, date: NaiveDate, sessions: &[&AttendanceSession]) -> DayTotal {
        let total_minutes = self.total_minutes(sessions.iter().copied());
        DayTotal {
            date,
            total_minutes,
            session_count: sessions.len(),
            open_sessions: sessions.iter().filter(|s| s.is_open()).count(),
            worked: total_minutes > 0,
        }
    }

    /// Summarizes sessions dated within `from..=to`.
    pub fn summarize_period<'a, I>(
        &self,
        sessions: I,
        from: NaiveDate,
        to: NaiveDate,
    ) -> PeriodSummary
    where
        I: IntoIterator<Item = &'a AttendanceSession>,
    {
        if from > to {
            return PeriodSummary::empty(from, to);
        }

        let groups = group_by_date(sessions);
        let mut summary = PeriodSummary::empty(from, to);
        for (date, day_sessions) in groups.range(from..=to) {
            let day = self.day_total(*date, day_sessions);
            if day.worked {
                summary.total_minutes += day.total_minutes;
                summary.days_worked += 1;
            }
            summary.days.push(day);
        }

        if summary.days_worked > 0 {
            summary.average_minutes_per_day =
                Some(summary.total_minutes / i64::from(summary.days_worked));
        }
        summary
    }
}

/// Partitions sessions by normalized calendar date.
///
/// Within a day, sessions are ordered by entry time; equal times fall back to
/// comparing the raw strings, and unparseable entry times sort last.
pub fn group_by_date<'a, I>(sessions: I) -> BTreeMap<NaiveDate, Vec<&'a AttendanceSession>>
where
    I: IntoIterator<Item = &'a AttendanceSession>,
{
    let mut groups: BTreeMap<NaiveDate, Vec<&'a AttendanceSession>> = BTreeMap::new();
    for session in sessions {
        match session.calendar_date() {
            Ok(date) => groups.entry(date).or_default().push(session),
            Err(err) => {
                tracing::warn!(
                    employee_id = %session.employee_id,
                    error = %err,
                    "unparseable session date, excluded from date views"
                );
            }
        }
    }

    for day in groups.values_mut() {
        day.sort_by_cached_key(|session| {
            (
                session.entry().map_or(i64::MAX, TimeOfDay::minutes),
                session.entry_time.clone(),
            )
        });
    }
    groups
}

/// Whether `employee_id` has a session on `date` with no exit time.
pub fn has_open_session<'a, I>(sessions: I, employee_id: &EmployeeId, date: NaiveDate) -> bool
where
    I: IntoIterator<Item = &'a AttendanceSession>,
{
    sessions.into_iter().any(|session| {
        session.is_open()
            && &session.employee_id == employee_id
            && session.calendar_date().is_ok_and(|d| d == date)
    })
}

/// An entry may be registered only when no session is open.
pub fn can_register_entry<'a, I>(sessions: I, employee_id: &EmployeeId, date: NaiveDate) -> bool
where
    I: IntoIterator<Item = &'a AttendanceSession>,
{
    !has_open_session(sessions, employee_id, date)
}

/// An exit may be registered only against an open session.
pub fn can_register_exit<'a, I>(sessions: I, employee_id: &EmployeeId, date: NaiveDate) -> bool
where
    I: IntoIterator<Item = &'a AttendanceSession>,
{
    has_open_session(sessions, employee_id, date)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;
    use std::sync::{Arc, Mutex};

    /// Log sink shared between the test and its scoped subscriber.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Runs `f` under a subscriber that records formatted events.
    fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        (result, String::from_utf8(bytes).unwrap())
    }

    fn emp(id: &str) -> EmployeeId {
        EmployeeId::new(id).unwrap()
    }

    fn closed(date: &str, entry: &str, exit: &str) -> AttendanceSession {
        AttendanceSession::closed(emp("alice"), date, entry, exit)
    }

    fn open(date: &str, entry: &str) -> AttendanceSession {
        AttendanceSession::open(emp("alice"), date, entry)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn with_policy(overnight: OvernightPolicy) -> Aggregator {
        Aggregator::new(AggregatorConfig { overnight })
    }

    // ========== session_duration ==========

    #[test]
    fn closed_session_duration() {
        let agg = Aggregator::default();
        let full_day = closed("2024-05-01", "09:00", "17:30");
        assert_eq!(agg.session_duration(&full_day), 510);
        // Seconds are dropped before subtracting.
        let with_seconds = closed("2024-05-01", "09:00:15", "09:45:59");
        assert_eq!(agg.session_duration(&with_seconds), 45);
    }

    #[test]
    fn open_session_duration_is_zero() {
        let agg = Aggregator::default();
        assert_eq!(agg.session_duration(&open("2024-05-02", "09:00")), 0);
        assert_eq!(agg.session_duration(&closed("2024-05-02", "09:00", "")), 0);
        // The entry time is irrelevant while the session is open.
        let garbled = open("2024-05-02", "garbage");
        assert_eq!(agg.try_session_duration(&garbled), Ok(0));
    }

    #[test]
    fn malformed_time_degrades_to_zero() {
        let agg = Aggregator::default();
        let session = closed("2024-05-01", "9", "17:00");
        assert!(matches!(
            agg.try_session_duration(&session),
            Err(ParseError::TimeFields { .. })
        ));
        let (minutes, logs) = capture_logs(|| agg.session_duration(&session));
        assert_eq!(minutes, 0);
        assert!(logs.contains("WARN"), "expected a warning, got: {logs}");
        assert!(logs.contains("counting 0 minutes"));
        assert!(logs.contains("employee_id=alice"));

        let session = closed("2024-05-01", "09:00", "five pm");
        assert!(agg.try_session_duration(&session).is_err());
        let (minutes, logs) = capture_logs(|| agg.session_duration(&session));
        assert_eq!(minutes, 0);
        assert!(logs.contains("unparseable session time"));
    }

    #[test]
    fn well_formed_sessions_do_not_warn() {
        let agg = Aggregator::default();
        let session = closed("2024-05-01", "09:00", "17:00");
        let (minutes, logs) = capture_logs(|| agg.session_duration(&session));
        assert_eq!(minutes, 480);
        assert!(logs.is_empty(), "unexpected logs: {logs}");
    }

    #[test]
    fn overnight_policies() {
        let session = closed("2024-05-01", "22:00", "06:00");
        let duration = |policy| with_policy(policy).session_duration(&session);
        assert_eq!(duration(OvernightPolicy::Negative), -960);
        assert_eq!(duration(OvernightPolicy::Clamp), 0);
        assert_eq!(duration(OvernightPolicy::WrapMidnight), 480);

        // Ordinary sessions are unaffected by the policy.
        let day = closed("2024-05-01", "09:00", "17:00");
        for policy in [
            OvernightPolicy::Negative,
            OvernightPolicy::Clamp,
            OvernightPolicy::WrapMidnight,
        ] {
            assert_eq!(with_policy(policy).session_duration(&day), 480);
        }
    }

    // ========== total_minutes ==========

    #[test]
    fn total_minutes_empty_is_zero() {
        let none: Vec<AttendanceSession> = Vec::new();
        assert_eq!(Aggregator::default().total_minutes(&none), 0);
    }

    #[test]
    fn total_minutes_is_order_independent() {
        let agg = Aggregator::default();
        let mut sessions = vec![
            closed("2024-05-01", "09:00", "13:00"),
            closed("2024-05-01", "14:00", "18:00"),
            open("2024-05-02", "09:00"),
            closed("2024-05-03", "08:15", "12:40"),
            closed("2024-05-03", "bad", "12:40"),
        ];
        let expected = agg.total_minutes(&sessions);
        assert_eq!(expected, 480 + 265);

        sessions.reverse();
        assert_eq!(agg.total_minutes(&sessions), expected);
        for _ in 0..sessions.len() {
            sessions.rotate_left(1);
            assert_eq!(agg.total_minutes(&sessions), expected);
        }
        sessions.swap(0, 3);
        assert_eq!(agg.total_minutes(&sessions), expected);
    }

    // ========== has_open_session ==========

    #[test]
    fn open_session_predicate() {
        let sessions = vec![
            closed("2024-05-01", "09:00", "17:00"),
            open("2024-05-02", "09:00"),
        ];
        let alice = emp("alice");
        assert!(has_open_session(&sessions, &alice, ymd(2024, 5, 2)));
        assert!(!has_open_session(&sessions, &alice, ymd(2024, 5, 1)));
        assert!(!has_open_session(&sessions, &emp("bob"), ymd(2024, 5, 2)));
        assert!(!has_open_session(&Vec::new(), &alice, ymd(2024, 5, 2)));
    }

    #[test]
    fn open_session_matches_any_date_format() {
        let sessions = vec![open("02/05/2024", "09:00")];
        assert!(has_open_session(&sessions, &emp("alice"), ymd(2024, 5, 2)));
    }

    #[test]
    fn registration_gates() {
        let alice = emp("alice");
        let today = ymd(2024, 5, 2);
        let none: Vec<AttendanceSession> = Vec::new();
        assert!(can_register_entry(&none, &alice, today));
        assert!(!can_register_exit(&none, &alice, today));

        let clocked_in = vec![open("2024-05-02", "09:00")];
        assert!(!can_register_entry(&clocked_in, &alice, today));
        assert!(can_register_exit(&clocked_in, &alice, today));
    }

    // ========== group_by_date ==========

    #[test]
    fn groups_by_normalized_date_and_orders_by_entry() {
        let sessions = vec![
            closed("2024-05-01", "14:00", "18:00"),
            closed("01/05/2024", "9:00", "13:00"),
            closed("2024-05-02", "10:00", "11:00"),
            closed("2024-05-01", "08:00", "08:30"),
        ];
        let groups = group_by_date(&sessions);
        assert_eq!(groups.len(), 2);

        let first_day: Vec<&str> = groups[&ymd(2024, 5, 1)]
            .iter()
            .map(|s| s.entry_time.as_str())
            .collect();
        assert_eq!(first_day, vec!["08:00", "9:00", "14:00"]);
        assert_eq!(groups[&ymd(2024, 5, 2)].len(), 1);
    }

    #[test]
    fn unparseable_entries_sort_last() {
        let sessions = vec![
            closed("2024-05-01", "oops", "18:00"),
            closed("2024-05-01", "10:00", "11:00"),
        ];
        let groups = group_by_date(&sessions);
        let day = &groups[&ymd(2024, 5, 1)];
        assert_eq!(day[0].entry_time, "10:00");
        assert_eq!(day[1].entry_time, "oops");
    }

    #[test]
    fn unparseable_dates_are_excluded() {
        let sessions = vec![
            closed("someday", "09:00", "17:00"),
            closed("2024-05-01", "09:00", "17:00"),
        ];
        let (groups, logs) = capture_logs(|| group_by_date(&sessions));
        assert_eq!(groups.len(), 1);
        assert!(groups.contains_key(&ymd(2024, 5, 1)));
        assert!(logs.contains("WARN"), "expected a warning, got: {logs}");
        assert!(logs.contains("unparseable session date"));
        assert_eq!(logs.lines().count(), 1);
    }

    // ========== summarize_period ==========

    #[test]
    fn empty_period_has_no_average() {
        let none: Vec<AttendanceSession> = Vec::new();
        let summary =
            Aggregator::default().summarize_period(&none, ymd(2024, 5, 1), ymd(2024, 5, 31));
        assert_eq!(summary.days_worked, 0);
        assert_eq!(summary.total_minutes, 0);
        assert_eq!(summary.average_minutes_per_day, None);
        assert!(summary.days.is_empty());
    }

    #[test]
    fn split_shift_is_one_worked_day() {
        let sessions = vec![
            closed("2024-05-01", "09:00", "13:00"),
            closed("2024-05-01", "14:00", "18:00"),
        ];
        let summary =
            Aggregator::default().summarize_period(&sessions, ymd(2024, 5, 1), ymd(2024, 5, 1));
        assert_eq!(summary.total_minutes, 480);
        assert_eq!(summary.days_worked, 1);
        assert_eq!(summary.average_minutes_per_day, Some(480));
        assert_eq!(summary.days[0].session_count, 2);
    }

    #[test]
    fn open_only_day_is_not_worked() {
        let sessions = vec![
            closed("2024-05-01", "09:00", "17:00"),
            open("2024-05-02", "09:00"),
        ];
        let summary =
            Aggregator::default().summarize_period(&sessions, ymd(2024, 5, 1), ymd(2024, 5, 7));
        assert_eq!(summary.days.len(), 2);
        assert_eq!(summary.days_worked, 1);
        assert_eq!(summary.total_minutes, 480);

        let open_day = &summary.days[1];
        assert_eq!(open_day.date, ymd(2024, 5, 2));
        assert!(!open_day.worked);
        assert_eq!(open_day.open_sessions, 1);
    }

    #[test]
    fn range_is_inclusive_and_normalized() {
        let sessions = vec![
            closed("30/04/2024", "09:00", "10:00"),
            closed("01/05/2024", "09:00", "11:00"),
            closed("2024-05-31", "09:00", "12:00"),
            closed("2024-06-01", "09:00", "13:00"),
        ];
        let summary =
            Aggregator::default().summarize_period(&sessions, ymd(2024, 5, 1), ymd(2024, 5, 31));
        assert_eq!(summary.days_worked, 2);
        assert_eq!(summary.total_minutes, 120 + 180);
        assert_eq!(summary.average_minutes_per_day, Some(150));
    }

    #[test]
    fn average_truncates() {
        let sessions = vec![
            closed("2024-05-01", "09:00", "10:00"),
            closed("2024-05-02", "09:00", "10:01"),
        ];
        let summary =
            Aggregator::default().summarize_period(&sessions, ymd(2024, 5, 1), ymd(2024, 5, 2));
        assert_eq!(summary.total_minutes, 121);
        assert_eq!(summary.average_minutes_per_day, Some(60));
    }

    #[test]
    fn negative_day_is_not_worked_and_not_totaled() {
        let sessions = vec![
            closed("2024-05-01", "22:00", "06:00"),
            closed("2024-05-02", "09:00", "17:00"),
        ];
        let summary =
            Aggregator::default().summarize_period(&sessions, ymd(2024, 5, 1), ymd(2024, 5, 2));
        assert_eq!(summary.days[0].total_minutes, -960);
        assert!(!summary.days[0].worked);
        assert_eq!(summary.days_worked, 1);
        assert_eq!(summary.total_minutes, 480);

        let wrapped = with_policy(OvernightPolicy::WrapMidnight).summarize_period(
            &sessions,
            ymd(2024, 5, 1),
            ymd(2024, 5, 2),
        );
        assert_eq!(wrapped.days_worked, 2);
        assert_eq!(wrapped.total_minutes, 960);
    }

    #[test]
    fn reversed_range_is_empty() {
        let sessions = vec![closed("2024-05-01", "09:00", "17:00")];
        let summary =
            Aggregator::default().summarize_period(&sessions, ymd(2024, 5, 31), ymd(2024, 5, 1));
        assert_eq!(summary.days_worked, 0);
        assert!(summary.days.is_empty());
    }

    // ========== elapsed_minutes ==========

    #[test]
    fn elapsed_only_for_open_sessions() {
        let agg = Aggregator::default();
        let now = TimeOfDay::from_hm(11, 30).unwrap();
        let in_progress = open("2024-05-02", "09:00");
        assert_eq!(agg.elapsed_minutes(&in_progress, now), Some(150));
        let finished = closed("2024-05-02", "09:00", "10:00");
        assert_eq!(agg.elapsed_minutes(&finished, now), None);
        let garbled = open("2024-05-02", "nine");
        assert_eq!(agg.elapsed_minutes(&garbled, now), None);
    }

    #[test]
    fn config_deserializes_policy() {
        let config: AggregatorConfig =
            serde_json::from_str(r#"{"overnight":"wrap_midnight"}"#).unwrap();
        assert_eq!(config.overnight, OvernightPolicy::WrapMidnight);
        let config: AggregatorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.overnight, OvernightPolicy::Negative);
    }
}
