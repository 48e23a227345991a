//! Day command: one employee's sessions on one date.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use tc_core::{Aggregator, AttendanceSession, Employee, display_date, format_hhmm, group_by_date};
use tc_db::Database;

use super::util::{employee_id, into_sessions, require_employee, resolve_date};
use crate::DayArgs;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    aggregator: &Aggregator,
    args: &DayArgs,
) -> Result<()> {
    let id = employee_id(&args.employee)?;
    let employee = require_employee(db, &id)?;
    let date = resolve_date(args.date.as_deref())?;
    let sessions = into_sessions(db.list_sessions_in_range(&id, date, date)?);
    write_day(writer, aggregator, &employee, date, &sessions)
}

fn write_day<W: Write>(
    writer: &mut W,
    aggregator: &Aggregator,
    employee: &Employee,
    date: NaiveDate,
    sessions: &[AttendanceSession],
) -> Result<()> {
    writeln!(
        writer,
        "{} ({}) on {}",
        employee.full_name(),
        employee.id,
        display_date(date)
    )?;

    let groups = group_by_date(sessions);
    let Some(day) = groups.get(&date) else {
        writeln!(writer, "No sessions.")?;
        return Ok(());
    };

    writeln!(writer, "ENTRY  EXIT   WORKED")?;
    for session in day {
        match session.exit() {
            Some(exit) => writeln!(
                writer,
                "{:<5}  {:<5}  {}",
                session.entry_time,
                exit,
                format_hhmm(aggregator.session_duration(session))
            )?,
            None => writeln!(writer, "{:<5}  --:--  open", session.entry_time)?,
        }
    }

    let total = aggregator.day_total(date, day);
    writeln!(writer, "Total: {}", format_hhmm(total.total_minutes))?;
    Ok(())
}
