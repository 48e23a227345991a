//! Storage layer for timecard.
//!
//! Provides persistence for departments, employees and attendance sessions
//! using `rusqlite`, plus the registration commands that open and close
//! sessions.
//!
//! # Connection Scope
//!
//! The [`Database`] type owns a single `rusqlite::Connection`, which is `Send`
//! but not `Sync`. Open one per unit of work and drop it when done; the
//! connection closes on drop. For multi-threaded access, either:
//! - Use a `Mutex<Database>` to serialize access
//! - Create a connection pool (e.g., with `r2d2`)
//! - Use separate `Database` instances per thread
//!
//! # Schema
//!
//! ## Date and Time Format
//!
//! Session dates are stored as TEXT in `yyyy-MM-dd` form, so lexicographic
//! ordering and range comparisons match calendar order. Dates arriving in
//! other formats are normalized through [`tc_core::parse_date`] on insert.
//!
//! Entry and exit times are stored as written (`HH:mm` for sessions opened by
//! [`Database::register_entry`]). An open session has `exit_time = NULL`;
//! legacy rows with an empty string are read back as open as well.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tc_core::{
    AttendanceSession, Department, Employee, EmployeeId, ParseError, Role, TimeOfDay,
    ValidationError, can_register_entry, can_register_exit, canonical_date, has_open_session,
    parse_date,
};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A record failed field validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A session date could not be normalized.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The referenced department does not exist.
    #[error("department not found: {0}")]
    UnknownDepartment(i64),
    /// The referenced employee does not exist.
    #[error("employee not found: {0}")]
    UnknownEmployee(EmployeeId),
    /// An employee with this ID is already registered.
    #[error("employee already exists: {0}")]
    DuplicateEmployee(EmployeeId),
    /// The department still has employees assigned.
    #[error("department {id} still has {employees} employee(s)")]
    DepartmentInUse { id: i64, employees: i64 },
    /// An entry was registered while a session is still open.
    #[error("{employee_id} already has an open session on {date}")]
    AlreadyClockedIn {
        employee_id: EmployeeId,
        date: NaiveDate,
    },
    /// An exit was registered with no open session.
    #[error("{employee_id} has no open session on {date}")]
    NotClockedIn {
        employee_id: EmployeeId,
        date: NaiveDate,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for connection scope.
pub struct Database {
    conn: Connection,
}

/// A stored attendance session with its row ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: i64,
    pub session: AttendanceSession,
}

const SESSION_COLUMNS: &str = "id, employee_id, date, entry_time, exit_time";
const EMPLOYEE_COLUMNS: &str = "id, first_name, last_name, email, department_id, phone, role";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS departments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS employees (
                id TEXT PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL,
                department_id INTEGER NOT NULL,
                phone TEXT,
                role TEXT NOT NULL DEFAULT 'employee',
                FOREIGN KEY (department_id) REFERENCES departments(id)
            );

            CREATE INDEX IF NOT EXISTS idx_employees_department ON employees(department_id);

            -- Sessions table: one entry/exit pair per row
            -- date: 'yyyy-MM-dd'
            -- exit_time: NULL while the session is open
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                employee_id TEXT NOT NULL,
                date TEXT NOT NULL,
                entry_time TEXT NOT NULL,
                exit_time TEXT,
                FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_employee_date ON sessions(employee_id, date);
            CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(date);
            ",
        )?;
        Ok(())
    }

    // ========== Departments ==========

    /// Inserts a department and returns its ID.
    pub fn insert_department(&mut self, name: &str) -> Result<i64, DbError> {
        let name = Department::validate_name(name)?;
        self.conn
            .execute("INSERT INTO departments (name) VALUES (?)", [name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_department(&self, id: i64) -> Result<Option<Department>, DbError> {
        let department = self
            .conn
            .query_row(
                "SELECT id, name FROM departments WHERE id = ?",
                [id],
                |row| {
                    Ok(Department {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(department)
    }

    /// Lists departments ordered by ID.
    pub fn list_departments(&self) -> Result<Vec<Department>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM departments ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(Department {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        let mut departments = Vec::new();
        for row in rows {
            departments.push(row?);
        }
        Ok(departments)
    }

    /// Deletes a department with no employees. Returns whether a row was removed.
    pub fn delete_department(&mut self, id: i64) -> Result<bool, DbError> {
        let employees: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM employees WHERE department_id = ?",
            [id],
            |row| row.get(0),
        )?;
        if employees > 0 {
            return Err(DbError::DepartmentInUse { id, employees });
        }
        let deleted = self
            .conn
            .execute("DELETE FROM departments WHERE id = ?", [id])?;
        Ok(deleted > 0)
    }

    // ========== Employees ==========

    /// Inserts a new employee after validation.
    pub fn insert_employee(&mut self, employee: &Employee) -> Result<(), DbError> {
        employee.validate()?;
        if !department_exists(&self.conn, employee.department_id)? {
            return Err(DbError::UnknownDepartment(employee.department_id));
        }
        if employee_exists(&self.conn, &employee.id)? {
            return Err(DbError::DuplicateEmployee(employee.id.clone()));
        }
        self.conn.execute(
            "
            INSERT INTO employees (id, first_name, last_name, email, department_id, phone, role)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                employee.id.as_str(),
                employee.first_name.trim(),
                employee.last_name.trim(),
                employee.email.trim(),
                employee.department_id,
                employee.phone,
                employee.role.as_str(),
            ],
        )?;
        tracing::debug!(employee_id = %employee.id, "inserted employee");
        Ok(())
    }

    /// Replaces an existing employee's fields.
    pub fn update_employee(&mut self, employee: &Employee) -> Result<(), DbError> {
        employee.validate()?;
        if !employee_exists(&self.conn, &employee.id)? {
            return Err(DbError::UnknownEmployee(employee.id.clone()));
        }
        if !department_exists(&self.conn, employee.department_id)? {
            return Err(DbError::UnknownDepartment(employee.department_id));
        }
        self.conn.execute(
            "
            UPDATE employees
            SET first_name = ?, last_name = ?, email = ?, department_id = ?, phone = ?, role = ?
            WHERE id = ?
            ",
            params![
                employee.first_name.trim(),
                employee.last_name.trim(),
                employee.email.trim(),
                employee.department_id,
                employee.phone,
                employee.role.as_str(),
                employee.id.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn get_employee(&self, id: &EmployeeId) -> Result<Option<Employee>, DbError> {
        let employee = self
            .conn
            .query_row(
                &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?"),
                [id.as_str()],
                employee_from_row,
            )
            .optional()?;
        Ok(employee)
    }

    /// Lists employees ordered by ID, optionally limited to one department.
    pub fn list_employees(&self, department_id: Option<i64>) -> Result<Vec<Employee>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {EMPLOYEE_COLUMNS}
            FROM employees
            WHERE ?1 IS NULL OR department_id = ?1
            ORDER BY id ASC
            "
        ))?;
        let rows = stmt.query_map([department_id], employee_from_row)?;
        let mut employees = Vec::new();
        for row in rows {
            employees.push(row?);
        }
        Ok(employees)
    }

    /// Deletes an employee and their sessions. Returns whether a row was removed.
    pub fn delete_employee(&mut self, id: &EmployeeId) -> Result<bool, DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM employees WHERE id = ?", [id.as_str()])?;
        Ok(deleted > 0)
    }

    // ========== Sessions ==========

    /// Inserts a batch of sessions in one transaction.
    ///
    /// Dates are normalized to `yyyy-MM-dd`; a date that no format in the
    /// fallback chain accepts aborts the batch. So does an open session for an
    /// employee and date that already has one, whether stored or earlier in
    /// the batch.
    pub fn insert_sessions(&mut self, sessions: &[AttendanceSession]) -> Result<usize, DbError> {
        if sessions.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO sessions (employee_id, date, entry_time, exit_time)
                VALUES (?, ?, ?, ?)
                ",
            )?;
            for session in sessions {
                if !employee_exists(&tx, &session.employee_id)? {
                    return Err(DbError::UnknownEmployee(session.employee_id.clone()));
                }
                let date = parse_date(&session.date)?;
                if session.is_open() {
                    // Rows inserted earlier in this batch are visible inside the transaction.
                    let day = day_sessions(&tx, &session.employee_id, date)?;
                    if !can_register_entry(
                        day.iter().map(|r| &r.session),
                        &session.employee_id,
                        date,
                    ) {
                        return Err(DbError::AlreadyClockedIn {
                            employee_id: session.employee_id.clone(),
                            date,
                        });
                    }
                }
                inserted += stmt.execute(params![
                    session.employee_id.as_str(),
                    canonical_date(date),
                    session.entry_time.trim(),
                    session.exit(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Lists an employee's sessions, most recent first.
    pub fn list_sessions(&self, employee_id: &EmployeeId) -> Result<Vec<SessionRecord>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {SESSION_COLUMNS}
            FROM sessions
            WHERE employee_id = ?
            ORDER BY date DESC, entry_time DESC, id DESC
            "
        ))?;
        let rows = stmt.query_map([employee_id.as_str()], session_from_row)?;
        collect_sessions(rows)
    }

    /// Lists every employee's sessions on one date, ordered by entry time.
    pub fn list_sessions_on(&self, date: NaiveDate) -> Result<Vec<SessionRecord>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {SESSION_COLUMNS}
            FROM sessions
            WHERE date = ?
            ORDER BY entry_time ASC, id ASC
            "
        ))?;
        let rows = stmt.query_map([canonical_date(date)], session_from_row)?;
        collect_sessions(rows)
    }

    /// Lists an employee's sessions within `from..=to`, oldest first.
    pub fn list_sessions_in_range(
        &self,
        employee_id: &EmployeeId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SessionRecord>, DbError> {
        if to < from {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {SESSION_COLUMNS}
            FROM sessions
            WHERE employee_id = ? AND date >= ? AND date <= ?
            ORDER BY date ASC, entry_time ASC, id ASC
            "
        ))?;
        let rows = stmt.query_map(
            params![employee_id.as_str(), canonical_date(from), canonical_date(to)],
            session_from_row,
        )?;
        collect_sessions(rows)
    }

    /// Deletes one session. Returns whether a row was removed.
    pub fn delete_session(&mut self, id: i64) -> Result<bool, DbError> {
        let deleted = self.conn.execute("DELETE FROM sessions WHERE id = ?", [id])?;
        Ok(deleted > 0)
    }

    // ========== Registration ==========

    /// Whether the employee has an open session on `date`.
    pub fn query_open_session(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
    ) -> Result<bool, DbError> {
        let day = day_sessions(&self.conn, employee_id, date)?;
        Ok(has_open_session(
            day.iter().map(|record| &record.session),
            employee_id,
            date,
        ))
    }

    /// Opens a session at `time`. Returns the new session ID.
    ///
    /// Fails with [`DbError::AlreadyClockedIn`] if a session is already open
    /// for the employee on `date`.
    pub fn register_entry(
        &mut self,
        employee_id: &EmployeeId,
        date: NaiveDate,
        time: TimeOfDay,
    ) -> Result<i64, DbError> {
        let tx = self.conn.transaction()?;
        if !employee_exists(&tx, employee_id)? {
            return Err(DbError::UnknownEmployee(employee_id.clone()));
        }
        let day = day_sessions(&tx, employee_id, date)?;
        if !can_register_entry(day.iter().map(|r| &r.session), employee_id, date) {
            return Err(DbError::AlreadyClockedIn {
                employee_id: employee_id.clone(),
                date,
            });
        }
        tx.execute(
            "
            INSERT INTO sessions (employee_id, date, entry_time, exit_time)
            VALUES (?, ?, ?, NULL)
            ",
            params![employee_id.as_str(), canonical_date(date), time.to_string()],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        tracing::info!(%employee_id, %date, %time, session_id = id, "registered entry");
        Ok(id)
    }

    /// Closes the open session at `time`. Returns the closed session's ID.
    ///
    /// Fails with [`DbError::NotClockedIn`] if no session is open for the
    /// employee on `date`.
    pub fn register_exit(
        &mut self,
        employee_id: &EmployeeId,
        date: NaiveDate,
        time: TimeOfDay,
    ) -> Result<i64, DbError> {
        let tx = self.conn.transaction()?;
        if !employee_exists(&tx, employee_id)? {
            return Err(DbError::UnknownEmployee(employee_id.clone()));
        }
        let day = day_sessions(&tx, employee_id, date)?;
        if !can_register_exit(day.iter().map(|r| &r.session), employee_id, date) {
            return Err(DbError::NotClockedIn {
                employee_id: employee_id.clone(),
                date,
            });
        }
        // Rows are ordered by entry time, so this closes the latest open one.
        let Some(open) = day.iter().rev().find(|r| r.session.is_open()) else {
            return Err(DbError::NotClockedIn {
                employee_id: employee_id.clone(),
                date,
            });
        };
        tx.execute(
            "UPDATE sessions SET exit_time = ? WHERE id = ?",
            params![time.to_string(), open.id],
        )?;
        let id = open.id;
        tx.commit()?;
        tracing::info!(%employee_id, %date, %time, session_id = id, "registered exit");
        Ok(id)
    }
}

fn department_exists(conn: &Connection, id: i64) -> Result<bool, DbError> {
    let found = conn
        .query_row("SELECT 1 FROM departments WHERE id = ?", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn employee_exists(conn: &Connection, id: &EmployeeId) -> Result<bool, DbError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM employees WHERE id = ?",
            [id.as_str()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn day_sessions(
    conn: &Connection,
    employee_id: &EmployeeId,
    date: NaiveDate,
) -> Result<Vec<SessionRecord>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "
        SELECT {SESSION_COLUMNS}
        FROM sessions
        WHERE employee_id = ? AND date = ?
        ORDER BY entry_time ASC, id ASC
        "
    ))?;
    let rows = stmt.query_map(
        params![employee_id.as_str(), canonical_date(date)],
        session_from_row,
    )?;
    collect_sessions(rows)
}

fn collect_sessions(
    rows: impl Iterator<Item = rusqlite::Result<SessionRecord>>,
) -> Result<Vec<SessionRecord>, DbError> {
    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(row?);
    }
    Ok(sessions)
}

fn employee_id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<EmployeeId> {
    let raw: String = row.get(idx)?;
    EmployeeId::new(raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    Ok(SessionRecord {
        id: row.get(0)?,
        session: AttendanceSession {
            employee_id: employee_id_column(row, 1)?,
            date: row.get(2)?,
            entry_time: row.get(3)?,
            exit_time: row.get(4)?,
        },
    })
}

fn employee_from_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    let role: String = row.get(6)?;
    let role: Role = role
        .parse()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(err)))?;
    Ok(Employee {
        id: employee_id_column(row, 0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        department_id: row.get(4)?,
        phone: row.get(5)?,
        role,
    })
}
