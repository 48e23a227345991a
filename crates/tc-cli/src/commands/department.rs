//! Department management commands.

use std::io::Write;

use anyhow::{Result, bail};
use tc_core::Department;
use tc_db::Database;

pub fn add<W: Write>(writer: &mut W, db: &mut Database, name: &str) -> Result<()> {
    let id = db.insert_department(name)?;
    writeln!(writer, "Added department {id}: {}", name.trim())?;
    Ok(())
}

pub fn list<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let departments = db.list_departments()?;
    write_departments(writer, &departments)
}

pub fn remove<W: Write>(writer: &mut W, db: &mut Database, id: i64) -> Result<()> {
    if !db.delete_department(id)? {
        bail!("department not found: {id}");
    }
    writeln!(writer, "Removed department {id}")?;
    Ok(())
}

fn write_departments<W: Write>(writer: &mut W, departments: &[Department]) -> Result<()> {
    if departments.is_empty() {
        writeln!(writer, "No departments.")?;
        return Ok(());
    }
    writeln!(writer, "{:<4}  NAME", "ID")?;
    for department in departments {
        writeln!(writer, "{:<4}  {}", department.id, department.name)?;
    }
    Ok(())
}
