//! Attendance CLI library.
//!
//! This crate provides the CLI interface for timecard.

mod cli;
pub mod commands;
mod config;

pub use cli::{
    Cli, ClockArgs, Commands, DayArgs, DepartmentAction, EmployeeAction, EmployeeAddArgs,
    ReportArgs, SessionsArgs,
};
pub use config::Config;
