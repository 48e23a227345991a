//! Status command: is an employee clocked in, and for how long.

use std::io::Write;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tc_core::{
    Aggregator, AttendanceSession, Employee, TimeOfDay, display_date, format_hhmm, group_by_date,
};
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

    // Elapsed time only makes sense against today's clock.
    let now = Local::now();
    let now = (date == now.date_naive()).then(|| TimeOfDay::from_naive(now.time()));

    let sessions = into_sessions(db.list_sessions_in_range(&id, date, date)?);
    write_status(writer, aggregator, &employee, date, &sessions, now)
}

fn write_status<W: Write>(
    writer: &mut W,
    aggregator: &Aggregator,
    employee: &Employee,
    date: NaiveDate,
    sessions: &[AttendanceSession],
    now: Option<TimeOfDay>,
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
        writeln!(writer, "State:   no sessions")?;
        return Ok(());
    };

    match day.iter().rev().find(|session| session.is_open()) {
        Some(open) => {
            let elapsed = now.and_then(|now| aggregator.elapsed_minutes(open, now));
            match elapsed {
                Some(minutes) => writeln!(
                    writer,
                    "State:   clocked in since {} ({} elapsed)",
                    open.entry_time,
                    format_hhmm(minutes)
                )?,
                None => writeln!(writer, "State:   clocked in since {}", open.entry_time)?,
            }
        }
        None => writeln!(writer, "State:   clocked out")?,
    }

    let total = aggregator.day_total(date, day);
    writeln!(
        writer,
        "Worked:  {} over {} session(s)",
        format_hhmm(total.total_minutes),
        total.session_count
    )?;
    Ok(())
}
