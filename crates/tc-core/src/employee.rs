//! Employees and departments.

use serde::{Deserialize, Serialize};

use crate::types::{EmployeeId, Role, ValidationError};

/// A department employees belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

impl Department {
    /// Validates a department name, returning it trimmed.
    pub fn validate_name(name: &str) -> Result<&str, ValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "department name",
            });
        }
        Ok(trimmed)
    }
}

/// An employee record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl Employee {
    /// Checks that every required text field is non-blank.
    ///
    /// Whether `department_id` exists is the storage layer's concern.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("email", &self.email),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::Empty { field });
            }
        }
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee() -> Employee {
        Employee {
            id: EmployeeId::new("12345678Z").unwrap(),
            first_name: "Ana".to_string(),
            last_name: "García".to_string(),
            email: "ana@example.com".to_string(),
            department_id: 1,
            phone: None,
            role: Role::Employee,
        }
    }

    #[test]
    fn valid_employee_passes() {
        assert_eq!(employee().validate(), Ok(()));
        assert_eq!(employee().full_name(), "Ana García");
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut e = employee();
        e.first_name = "  ".to_string();
        assert_eq!(
            e.validate(),
            Err(ValidationError::Empty {
                field: "first name"
            })
        );

        let mut e = employee();
        e.email = String::new();
        assert_eq!(e.validate(), Err(ValidationError::Empty { field: "email" }));
    }

    #[test]
    fn department_name_is_trimmed() {
        assert_eq!(Department::validate_name("  Sales "), Ok("Sales"));
        assert!(Department::validate_name("   ").is_err());
    }

    #[test]
    fn role_defaults_when_missing() {
        let json = concat!(
            r#"{"id":"1X","first_name":"A","last_name":"B","#,
            r#""email":"a@b","department_id":2}"#
        );
        let e: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(e.role, Role::Employee);
        assert_eq!(e.phone, None);
    }
}
