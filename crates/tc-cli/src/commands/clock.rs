//! Entry and exit registration (`timecard in` / `timecard out`).

use std::io::Write;

use anyhow::Result;
use tc_core::{Aggregator, display_date, format_hhmm};
use tc_db::Database;

use super::util::{employee_id, require_employee, resolve_date, resolve_time};
use crate::ClockArgs;

pub fn clock_in<W: Write>(writer: &mut W, db: &mut Database, args: &ClockArgs) -> Result<()> {
    let id = employee_id(&args.employee)?;
    let employee = require_employee(db, &id)?;
    let date = resolve_date(args.date.as_deref())?;
    let time = resolve_time(args.time.as_deref())?;

    db.register_entry(&id, date, time)?;
    writeln!(
        writer,
        "{} clocked in at {time} on {}",
        employee.full_name(),
        display_date(date)
    )?;
    Ok(())
}

pub fn clock_out<W: Write>(
    writer: &mut W,
    db: &mut Database,
    aggregator: &Aggregator,
    args: &ClockArgs,
) -> Result<()> {
    let id = employee_id(&args.employee)?;
    let employee = require_employee(db, &id)?;
    let date = resolve_date(args.date.as_deref())?;
    let time = resolve_time(args.time.as_deref())?;

    let session_id = db.register_exit(&id, date, time)?;
    let day = db.list_sessions_on(date)?;
    let worked = day
        .iter()
        .find(|record| record.id == session_id)
        .map_or(0, |record| aggregator.session_duration(&record.session));

    writeln!(
        writer,
        "{} clocked out at {time} on {} ({} worked)",
        employee.full_name(),
        display_date(date),
        format_hhmm(worked)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tc_core::{Employee, EmployeeId, Role};

    fn seeded() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        let dept = db.insert_department("Engineering").unwrap();
        db.insert_employee(&Employee {
            id: EmployeeId::new("alice").unwrap(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            email: "alice@example.com".to_string(),
            department_id: dept,
            phone: None,
            role: Role::Employee,
        })
        .unwrap();
        db
    }

    fn at(time: &str) -> ClockArgs {
        ClockArgs {
            employee: "alice".to_string(),
            date: Some("2024-05-01".to_string()),
            time: Some(time.to_string()),
        }
    }

    #[test]
    fn clock_in_then_out_reports_duration() {
        let mut db = seeded();
        let aggregator = Aggregator::default();

        let mut output = Vec::new();
        clock_in(&mut output, &mut db, &at("09:00")).unwrap();
        clock_out(&mut output, &mut db, &aggregator, &at("17:30")).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Alice Smith clocked in at 09:00 on 01/05/2024\n\
             Alice Smith clocked out at 17:30 on 01/05/2024 (08:30 worked)\n"
        );
    }

    #[test]
    fn second_clock_in_is_rejected() {
        let mut db = seeded();
        let mut output = Vec::new();
        clock_in(&mut output, &mut db, &at("09:00")).unwrap();
        let err = clock_in(&mut output, &mut db, &at("09:10")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "alice already has an open session on 2024-05-01"
        );
    }

    #[test]
    fn clock_out_without_entry_is_rejected() {
        let mut db = seeded();
        let mut output = Vec::new();
        let aggregator = Aggregator::default();
        let err = clock_out(&mut output, &mut db, &aggregator, &at("17:00")).unwrap_err();
        assert_eq!(err.to_string(), "alice has no open session on 2024-05-01");
        assert!(output.is_empty());
    }

    #[test]
    fn unknown_employee_is_rejected() {
        let mut db = seeded();
        let mut args = at("09:00");
        args.employee = "bob".to_string();
        let mut output = Vec::new();
        let err = clock_in(&mut output, &mut db, &args).unwrap_err();
        assert_eq!(err.to_string(), "employee not found: bob");
    }
}
