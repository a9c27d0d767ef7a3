//! SQLite storage bootstrap and schema entry points.
//!
//! # Responsibility
//! - Open and configure the SQLite connection backing the student store.
//! - Create the `Alumnos` table idempotently before any data access.
//!
//! # Invariants
//! - The schema is fixed; there is no versioning or migration step.
//! - Core code must not read/write student rows before `ensure_schema` succeeds.

use std::path::PathBuf;

use thiserror::Error;

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::{ensure_schema, SequenceReset, STUDENT_COLUMNS, STUDENT_TABLE};

pub type DbResult<T> = Result<T, DbError>;

/// Connection and schema bootstrap failures.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to open database at '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
}
