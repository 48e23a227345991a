//! Calendar command: a month grid marking the days an employee has sessions.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Weekday};
use tc_core::period::month_range;
use tc_core::{Aggregator, AttendanceSession, Employee, format_hhmm};
use tc_db::Database;

use super::util::{employee_id, into_sessions, require_employee, resolve_date};
use crate::DayArgs;

const WORKED: char = '*';
const UNWORKED: char = '+';

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    aggregator: &Aggregator,
    args: &DayArgs,
) -> Result<()> {
    let id = employee_id(&args.employee)?;
    let employee = require_employee(db, &id)?;
    let reference = resolve_date(args.date.as_deref())?;
    let (first, last) = month_range(reference);
    let sessions = into_sessions(db.list_sessions_in_range(&id, first, last)?);
    write_calendar(writer, aggregator, &employee, reference, &sessions)
}

fn write_calendar<W: Write>(
    writer: &mut W,
    aggregator: &Aggregator,
    employee: &Employee,
    reference: NaiveDate,
    sessions: &[AttendanceSession],
) -> Result<()> {
    let (first, last) = month_range(reference);
    let summary = aggregator.summarize_period(sessions, first, last);
    let marks: BTreeMap<NaiveDate, char> = summary
        .days
        .iter()
        .map(|day| (day.date, if day.worked { WORKED } else { UNWORKED }))
        .collect();

    writeln!(
        writer,
        "{} - {} ({})",
        first.format("%B %Y"),
        employee.full_name(),
        employee.id
    )?;
    writeln!(writer, "Mo  Tu  We  Th  Fr  Sa  Su")?;

    let mut line = String::new();
    for _ in 0..first.weekday().num_days_from_monday() {
        line.push_str("    ");
    }
    for date in first.iter_days().take_while(|date| *date <= last) {
        let mark = marks.get(&date).copied().unwrap_or(' ');
        write!(line, "{:>2}{mark} ", date.day())?;
        if date.weekday() == Weekday::Sun {
            writeln!(writer, "{}", line.trim_end())?;
            line.clear();
        }
    }
    if !line.is_empty() {
        writeln!(writer, "{}", line.trim_end())?;
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "{WORKED} worked  {UNWORKED} sessions without worked time"
    )?;
    writeln!(
        writer,
        "Days worked: {}  Total: {}",
        summary.days_worked,
        format_hhmm(summary.total_minutes)
    )?;
    Ok(())
}
