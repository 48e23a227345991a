use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tc_core::Aggregator;
use tracing_subscriber::EnvFilter;

use tc_cli::commands::{
    calendar, clock, day, department, employee, import, report, sessions, status,
};
use tc_cli::{Cli, Commands, Config, DepartmentAction, EmployeeAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(tc_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = tc_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let aggregator = Aggregator::new(config.aggregator());
    let mut out = io::stdout().lock();

    match command {
        Commands::Department(action) => match action {
            DepartmentAction::Add { name } => department::add(&mut out, &mut db, name)?,
            DepartmentAction::List => department::list(&mut out, &db)?,
            DepartmentAction::Remove { id } => department::remove(&mut out, &mut db, *id)?,
        },
        Commands::Employee(action) => match action {
            EmployeeAction::Add(args) => employee::add(&mut out, &mut db, args)?,
            EmployeeAction::List { department } => employee::list(&mut out, &db, *department)?,
            EmployeeAction::Remove { id } => employee::remove(&mut out, &mut db, id)?,
        },
        Commands::In(args) => clock::clock_in(&mut out, &mut db, args)?,
        Commands::Out(args) => clock::clock_out(&mut out, &mut db, &aggregator, args)?,
        Commands::Status(args) => status::run(&mut out, &db, &aggregator, args)?,
        Commands::Day(args) => day::run(&mut out, &db, &aggregator, args)?,
        Commands::Calendar(args) => calendar::run(&mut out, &db, &aggregator, args)?,
        Commands::Report(args) => report::run(&mut out, &db, &aggregator, args)?,
        Commands::Sessions(args) => sessions::run(&mut out, &db, &aggregator, args)?,
        Commands::Import => {
            let summary = import::run(io::stdin().lock(), &mut db)?;
            eprintln!(
                "Imported {} session(s), skipped {} malformed line(s)",
                summary.inserted, summary.skipped
            );
        }
    }

    Ok(())
}
