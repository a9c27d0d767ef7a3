//! Student domain model and query expressions.
//!
//! # Responsibility
//! - Define the canonical student record and its validation rules.
//! - Describe row selection (`StudentFilter`) and field transforms
//!   (`StudentUpdate`) independently of SQL.
//!
//! # Invariants
//! - `Student::id` is assigned by the store and never changes afterwards.

pub mod query;
pub mod student;
