//! Student domain model.
//!
//! # Invariants
//! - `name` is never blank.
//! - `age` is never negative.
//! - Inserts take a `NewStudent` and the store assigns `id`. `Student` stays
//!   constructible for snapshots and deserialization, so an `id` built by
//!   hand is not guaranteed to exist in storage.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Store-assigned surrogate key (`Alumnos.Id`).
pub type StudentId = i64;

/// Validation failures for student fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudentValidationError {
    #[error("student name cannot be blank")]
    BlankName,
    #[error("student age cannot be negative, got {0}")]
    NegativeAge(i64),
    #[error("student age {age} plus {delta} overflows")]
    AgeOverflow { age: i64, delta: i64 },
}

/// A student record that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub age: i64,
}

impl NewStudent {
    pub fn new(name: impl Into<String>, age: i64) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }

    pub fn validate(&self) -> Result<(), StudentValidationError> {
        validate_fields(&self.name, self.age)
    }
}

/// A persisted student row.
///
/// Serialized with the storage column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "Id")]
    pub id: StudentId,
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(rename = "Edad")]
    pub age: i64,
}

impl Student {
    /// Pairs an unsaved record with the id the store assigned to it.
    pub fn from_new(id: StudentId, student: NewStudent) -> Self {
        Self {
            id,
            name: student.name,
            age: student.age,
        }
    }

    pub fn validate(&self) -> Result<(), StudentValidationError> {
        validate_fields(&self.name, self.age)
    }
}

impl Display for Student {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ID: {}, Nombre: {}, Edad: {}", self.id, self.name, self.age)
    }
}

pub(crate) fn validate_name(name: &str) -> Result<(), StudentValidationError> {
    if name.trim().is_empty() {
        return Err(StudentValidationError::BlankName);
    }
    Ok(())
}

fn validate_fields(name: &str, age: i64) -> Result<(), StudentValidationError> {
    validate_name(name)?;
    if age < 0 {
        return Err(StudentValidationError::NegativeAge(age));
    }
    Ok(())
}
