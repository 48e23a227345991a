//! CLI subcommand implementations.

pub mod calendar;
pub mod clock;
pub mod day;
pub mod department;
pub mod employee;
pub mod import;
pub mod report;
pub mod sessions;
pub mod status;
mod util;
