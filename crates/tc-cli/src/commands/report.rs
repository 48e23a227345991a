//! Report command for worked-time summaries.
//!
//! This module implements `timecard report` over a week (default), a month or
//! an explicit `--from`/`--to` range, with human-readable and JSON output.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::Serialize;
use tc_core::{
    Aggregator, Employee, Period, PeriodSummary, canonical_date, display_date, format_hhmm,
    parse_date,
};
use tc_db::Database;

use super::util::{employee_id, into_sessions, require_employee, resolve_date};
use crate::ReportArgs;

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    pub employee: Employee,
    /// `None` for an explicit `--from`/`--to` range.
    pub period: Option<Period>,
    pub summary: PeriodSummary,
}

impl ReportData {
    fn period_label(&self) -> &'static str {
        self.period.map_or("range", Period::label)
    }
}

// ========== Period Resolution ==========

/// Resolves the report period and its inclusive date range from arguments.
pub fn resolve_period(args: &ReportArgs) -> Result<(Option<Period>, NaiveDate, NaiveDate)> {
    if let (Some(from), Some(to)) = (args.from.as_deref(), args.to.as_deref()) {
        let from = parse_date(from)?;
        let to = parse_date(to)?;
        if from > to {
            bail!("--from {from} is after --to {to}");
        }
        return Ok((None, from, to));
    }

    let reference = resolve_date(args.date.as_deref())?;
    let period = if args.month {
        Period::Month
    } else {
        Period::Week
    };
    let (from, to) = period.range(reference);
    Ok((Some(period), from, to))
}

fn period_description(data: &ReportData) -> String {
    let summary = &data.summary;
    match data.period {
        Some(Period::Week) => format!(
            "Week of {} - {}",
            display_date(summary.from),
            display_date(summary.to)
        ),
        Some(Period::Month) => summary.from.format("%B %Y").to_string(),
        None => format!(
            "{} - {}",
            display_date(summary.from),
            display_date(summary.to)
        ),
    }
}

// ========== Text Output ==========

/// Writes the human-readable report.
pub fn write_report<W: Write>(writer: &mut W, data: &ReportData) -> Result<()> {
    let summary = &data.summary;
    writeln!(
        writer,
        "ATTENDANCE REPORT: {} ({})",
        data.employee.full_name(),
        data.employee.id
    )?;
    writeln!(writer, "{}", period_description(data))?;
    writeln!(writer)?;

    if summary.days.is_empty() {
        writeln!(writer, "No sessions recorded in this period.")?;
    } else {
        writeln!(writer, "{:<10}  {:>8}  {:>6}", "DATE", "SESSIONS", "WORKED")?;
        for day in &summary.days {
            let mut notes = Vec::new();
            if day.open_sessions > 0 {
                notes.push("open");
            }
            if !day.worked {
                notes.push("not counted");
            }
            let notes = if notes.is_empty() {
                String::new()
            } else {
                format!("  {}", notes.join(", "))
            };
            writeln!(
                writer,
                "{:<10}  {:>8}  {:>6}{notes}",
                display_date(day.date),
                day.session_count,
                format_hhmm(day.total_minutes)
            )?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "SUMMARY")?;
    writeln!(writer, "───────")?;
    writeln!(
        writer,
        "Total worked:   {}",
        format_hhmm(summary.total_minutes)
    )?;
    writeln!(writer, "Days worked:    {}", summary.days_worked)?;
    writeln!(
        writer,
        "Daily average:  {}",
        summary
            .average_minutes_per_day
            .map_or_else(|| "--:--".to_string(), format_hhmm)
    )?;
    Ok(())
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub employee_id: String,
    pub employee_name: String,
    pub period: JsonPeriod,
    pub total_minutes: i64,
    pub total: String,
    pub days_worked: u32,
    pub average_minutes_per_day: Option<i64>,
    pub average: Option<String>,
    pub days: Vec<JsonDay>,
}

#[derive(Debug, Serialize)]
pub struct JsonPeriod {
    #[serde(rename = "type")]
    pub period_type: &'static str,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct JsonDay {
    pub date: String,
    pub sessions: usize,
    pub open_sessions: usize,
    pub total_minutes: i64,
    pub total: String,
    pub worked: bool,
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    let summary = &data.summary;
    let report = JsonReport {
        employee_id: data.employee.id.to_string(),
        employee_name: data.employee.full_name(),
        period: JsonPeriod {
            period_type: data.period_label(),
            start: canonical_date(summary.from),
            end: canonical_date(summary.to),
        },
        total_minutes: summary.total_minutes,
        total: format_hhmm(summary.total_minutes),
        days_worked: summary.days_worked,
        average_minutes_per_day: summary.average_minutes_per_day,
        average: summary.average_minutes_per_day.map(format_hhmm),
        days: summary
            .days
            .iter()
            .map(|day| JsonDay {
                date: canonical_date(day.date),
                sessions: day.session_count,
                open_sessions: day.open_sessions,
                total_minutes: day.total_minutes,
                total: format_hhmm(day.total_minutes),
                worked: day.worked,
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    aggregator: &Aggregator,
    args: &ReportArgs,
) -> Result<()> {
    let id = employee_id(&args.employee)?;
    let employee = require_employee(db, &id)?;
    let (period, from, to) = resolve_period(args)?;
    tracing::debug!(%id, ?period, %from, %to, "generating report");

    let sessions = into_sessions(db.list_sessions_in_range(&id, from, to)?);
    let summary = aggregator.summarize_period(&sessions, from, to);
    let data = ReportData {
        employee,
        period,
        summary,
    };

    if args.json {
        writeln!(writer, "{}", format_report_json(&data)?)?;
    } else {
        write_report(writer, &data)?;
    }
    Ok(())
}
