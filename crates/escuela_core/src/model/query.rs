//! Row selection and bulk transform expressions over student fields.
//!
//! Both types are plain data; the repository compiles them to SQL so that
//! bulk operations run inside SQLite. `matches`/`apply` give the same answer
//! in memory.

use super::student::{validate_name, Student, StudentValidationError};

/// Comparison operator for integer fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    pub(crate) fn sql_operator(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    fn holds(self, left: i64, right: i64) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
        }
    }
}

/// Boolean condition selecting student rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentFilter {
    /// Every row.
    All,
    /// Exact, case-sensitive name match.
    NameEq(String),
    Age(Comparison, i64),
    And(Box<StudentFilter>, Box<StudentFilter>),
    Or(Box<StudentFilter>, Box<StudentFilter>),
    Not(Box<StudentFilter>),
}

impl StudentFilter {
    pub fn name_eq(name: impl Into<String>) -> Self {
        Self::NameEq(name.into())
    }

    pub fn age_at_least(age: i64) -> Self {
        Self::Age(Comparison::Ge, age)
    }

    pub fn age_below(age: i64) -> Self {
        Self::Age(Comparison::Lt, age)
    }

    pub fn and(self, other: StudentFilter) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: StudentFilter) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluates the condition against an in-memory copy.
    pub fn matches(&self, student: &Student) -> bool {
        match self {
            Self::All => true,
            Self::NameEq(name) => student.name == *name,
            Self::Age(op, value) => op.holds(student.age, *value),
            Self::And(left, right) => left.matches(student) && right.matches(student),
            Self::Or(left, right) => left.matches(student) || right.matches(student),
            Self::Not(inner) => !inner.matches(student),
        }
    }
}

/// Field-level transform applied by `update_where`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentUpdate {
    /// `Edad = Edad + n`; negative `n` decrements.
    IncrementAge(i64),
    SetAge(i64),
    Rename(String),
}

impl StudentUpdate {
    /// Rejects transforms that would always write an invalid value.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        match self {
            Self::IncrementAge(_) => Ok(()),
            Self::SetAge(age) if *age < 0 => Err(StudentValidationError::NegativeAge(*age)),
            Self::SetAge(_) => Ok(()),
            Self::Rename(name) => validate_name(name),
        }
    }

    /// Applies the transform to an in-memory copy; identity is untouched.
    ///
    /// Leaves `student` unchanged when the result would be invalid.
    pub fn apply(&self, student: &mut Student) -> Result<(), StudentValidationError> {
        self.validate()?;
        match self {
            Self::IncrementAge(delta) => {
                let age = student
                    .age
                    .checked_add(*delta)
                    .ok_or(StudentValidationError::AgeOverflow {
                        age: student.age,
                        delta: *delta,
                    })?;
                if age < 0 {
                    return Err(StudentValidationError::NegativeAge(age));
                }
                student.age = age;
            }
            Self::SetAge(age) => student.age = *age,
            Self::Rename(name) => student.name.clone_from(name),
        }
        Ok(())
    }
}
