//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the record-store contract over student rows.
//! - Isolate SQLite query details from the service and the driver.
//!
//! # Invariants
//! - Writes validate records before any SQL mutation.
//! - Bulk delete/update run as single statements inside SQLite.

pub mod student_repo;
