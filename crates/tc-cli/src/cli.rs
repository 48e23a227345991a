//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Employee attendance clock.
///
/// Registers entries and exits, and summarizes worked time per day, week or
/// month.
#[derive(Debug, Parser)]
#[command(name = "timecard", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage departments.
    #[command(subcommand)]
    Department(DepartmentAction),

    /// Manage employees.
    #[command(subcommand)]
    Employee(EmployeeAction),

    /// Register an entry (clock in).
    In(ClockArgs),

    /// Register an exit (clock out).
    Out(ClockArgs),

    /// Show whether an employee is clocked in.
    Status(DayArgs),

    /// Show one day's sessions and total.
    Day(DayArgs),

    /// Show a month calendar marking days with sessions.
    Calendar(DayArgs),

    /// Summarize worked time over a week, month or date range.
    Report(ReportArgs),

    /// List an employee's raw sessions.
    Sessions(SessionsArgs),

    /// Import sessions from JSONL on stdin.
    Import,
}

#[derive(Debug, Subcommand)]
pub enum DepartmentAction {
    /// Add a department.
    Add {
        /// Department name.
        name: String,
    },
    /// List departments.
    List,
    /// Remove a department with no employees.
    Remove {
        /// Department ID.
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum EmployeeAction {
    /// Register an employee.
    Add(EmployeeAddArgs),
    /// List employees.
    List {
        /// Only show employees of this department.
        #[arg(long)]
        department: Option<i64>,
    },
    /// Remove an employee and their sessions.
    Remove {
        /// Employee ID.
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct EmployeeAddArgs {
    /// Employee ID (e.g. a national ID number).
    #[arg(long)]
    pub id: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: String,

    /// Department ID.
    #[arg(long)]
    pub department: i64,

    #[arg(long)]
    pub phone: Option<String>,

    /// Grant the admin role.
    #[arg(long)]
    pub admin: bool,
}

#[derive(Debug, Args)]
pub struct ClockArgs {
    /// Employee ID.
    pub employee: String,

    /// Date to register on (defaults to today).
    #[arg(long)]
    pub date: Option<String>,

    /// Time to register, `HH:mm` (defaults to now).
    #[arg(long)]
    pub time: Option<String>,
}

#[derive(Debug, Args)]
pub struct DayArgs {
    /// Employee ID.
    pub employee: String,

    /// Reference date (defaults to today).
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Employee ID.
    pub employee: String,

    /// Report the week (Monday to Sunday) containing the reference date (default).
    #[arg(long, conflicts_with_all = ["month", "from"])]
    pub week: bool,

    /// Report the month containing the reference date.
    #[arg(long, conflicts_with = "from")]
    pub month: bool,

    /// First day of a custom range.
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// Last day of a custom range.
    #[arg(long, requires = "from")]
    pub to: Option<String>,

    /// Reference date (defaults to today).
    #[arg(long, conflicts_with = "from")]
    pub date: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SessionsArgs {
    /// Employee ID.
    pub employee: String,

    /// Output JSONL in the `import` format.
    #[arg(long)]
    pub json: bool,
}
