//! Import command for loading sessions into the local `SQLite` store.
//!
//! Reads one JSON `AttendanceSession` per line, the format
//! `timecard sessions --json` writes.

use std::io::BufRead;

use anyhow::{Context, Result};
use tc_core::AttendanceSession;
use tc_db::Database;

/// Outcome of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

pub fn run<R: BufRead>(reader: R, db: &mut Database) -> Result<ImportSummary> {
    let (sessions, skipped) = parse_sessions(reader)?;
    let inserted = db
        .insert_sessions(&sessions)
        .context("failed to store imported sessions")?;
    Ok(ImportSummary { inserted, skipped })
}

/// Parses JSONL sessions, skipping lines that do not deserialize.
fn parse_sessions<R: BufRead>(reader: R) -> Result<(Vec<AttendanceSession>, usize)> {
    let mut sessions = Vec::new();
    let mut skipped = 0;
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<AttendanceSession>(trimmed) {
            Ok(session) => sessions.push(session),
            Err(err) => {
                tracing::warn!(line = idx + 1, error = %err, "skipping malformed session");
                skipped += 1;
            }
        }
    }
    Ok((sessions, skipped))
}
