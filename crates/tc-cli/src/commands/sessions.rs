//! Sessions command: raw session listing, most recent first.
//!
//! `--json` emits one JSON object per line in the format `timecard import`
//! reads, so the output can be moved between databases.

use std::io::Write;

use anyhow::{Context, Result};
use tc_core::{Aggregator, display_date, format_hhmm};
use tc_db::{Database, SessionRecord};

use super::util::{employee_id, require_employee};
use crate::SessionsArgs;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    aggregator: &Aggregator,
    args: &SessionsArgs,
) -> Result<()> {
    let id = employee_id(&args.employee)?;
    require_employee(db, &id)?;
    let records = db.list_sessions(&id)?;
    if args.json {
        write_jsonl(writer, &records)
    } else {
        write_table(writer, aggregator, &records)
    }
}

fn write_jsonl<W: Write>(writer: &mut W, records: &[SessionRecord]) -> Result<()> {
    for record in records {
        let line = serde_json::to_string(&record.session)
            .with_context(|| format!("failed to encode session {}", record.id))?;
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

fn write_table<W: Write>(
    writer: &mut W,
    aggregator: &Aggregator,
    records: &[SessionRecord],
) -> Result<()> {
    if records.is_empty() {
        writeln!(writer, "No sessions.")?;
        return Ok(());
    }
    writeln!(writer, "ID    DATE        ENTRY  EXIT   WORKED")?;
    for record in records {
        let session = &record.session;
        let date = session
            .calendar_date()
            .map_or_else(|_| session.date.clone(), display_date);
        let (exit, worked) = match session.exit() {
            Some(exit) => (
                exit.to_string(),
                format_hhmm(aggregator.session_duration(session)),
            ),
            None => ("--:--".to_string(), "open".to_string()),
        };
        writeln!(
            writer,
            "{:<4}  {date:<10}  {:<5}  {exit:<5}  {worked}",
            record.id, session.entry_time
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use tc_core::{AttendanceSession, EmployeeId};

    fn records() -> Vec<SessionRecord> {
        let id = EmployeeId::new("alice").unwrap();
        vec![
            SessionRecord {
                id: 3,
                session: AttendanceSession::open(id.clone(), "2024-05-02", "09:00"),
            },
            SessionRecord {
                id: 2,
                session: AttendanceSession::closed(id.clone(), "2024-05-01", "14:00", "18:00"),
            },
            SessionRecord {
                id: 1,
                session: AttendanceSession::closed(id, "2024-05-01", "09:00", "13:00"),
            },
        ]
    }

    #[test]
    fn sessions_table() {
        let mut output = Vec::new();
        write_table(&mut output, &Aggregator::default(), &records()).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        ID    DATE        ENTRY  EXIT   WORKED
        3     02/05/2024  09:00  --:--  open
        2     01/05/2024  14:00  18:00  04:00
        1     01/05/2024  09:00  13:00  04:00
        ");
    }

    #[test]
    fn sessions_jsonl_matches_import_format() {
        let mut output = Vec::new();
        write_jsonl(&mut output, &records()).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @r#"
        {"employee_id":"alice","date":"2024-05-02","entry_time":"09:00"}
        {"employee_id":"alice","date":"2024-05-01","entry_time":"14:00","exit_time":"18:00"}
        {"employee_id":"alice","date":"2024-05-01","entry_time":"09:00","exit_time":"13:00"}
        "#);
    }

    #[test]
    fn sessions_empty() {
        let mut output = Vec::new();
        write_table(&mut output, &Aggregator::default(), &[]).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "No sessions.\n");
    }
}
