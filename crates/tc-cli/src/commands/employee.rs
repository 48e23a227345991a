//! Employee management commands.

use std::io::Write;

use anyhow::{Result, bail};
use tc_core::{Employee, Role};
use tc_db::Database;

use super::util::employee_id;
use crate::EmployeeAddArgs;

pub fn add<W: Write>(writer: &mut W, db: &mut Database, args: &EmployeeAddArgs) -> Result<()> {
    let employee = Employee {
        id: employee_id(&args.id)?,
        first_name: args.first_name.clone(),
        last_name: args.last_name.clone(),
        email: args.email.clone(),
        department_id: args.department,
        phone: args.phone.clone().filter(|phone| !phone.trim().is_empty()),
        role: if args.admin {
            Role::Admin
        } else {
            Role::Employee
        },
    };
    db.insert_employee(&employee)?;
    writeln!(
        writer,
        "Added {} {} ({})",
        employee.role,
        employee.id,
        employee.full_name().trim()
    )?;
    Ok(())
}

pub fn list<W: Write>(writer: &mut W, db: &Database, department: Option<i64>) -> Result<()> {
    if let Some(id) = department {
        if db.get_department(id)?.is_none() {
            bail!("department not found: {id}");
        }
    }
    let employees = db.list_employees(department)?;
    write_employees(writer, &employees)
}

pub fn remove<W: Write>(writer: &mut W, db: &mut Database, id: &str) -> Result<()> {
    let id = employee_id(id)?;
    if !db.delete_employee(&id)? {
        bail!("employee not found: {id}");
    }
    writeln!(writer, "Removed employee {id}")?;
    Ok(())
}

fn write_employees<W: Write>(writer: &mut W, employees: &[Employee]) -> Result<()> {
    if employees.is_empty() {
        writeln!(writer, "No employees.")?;
        return Ok(());
    }
    let id_width = employees
        .iter()
        .map(|e| e.id.as_str().chars().count())
        .max()
        .unwrap_or(0)
        .max(2);
    let name_width = employees
        .iter()
        .map(|e| e.full_name().chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    writeln!(
        writer,
        "{:<id_width$}  {:<name_width$}  DEPT  ROLE      EMAIL",
        "ID", "NAME"
    )?;
    for employee in employees {
        writeln!(
            writer,
            "{:<id_width$}  {:<name_width$}  {:<4}  {:<8}  {}",
            employee.id.as_str(),
            employee.full_name(),
            employee.department_id,
            employee.role.as_str(),
            employee.email,
        )?;
    }
    Ok(())
}
