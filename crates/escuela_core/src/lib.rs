//! Core record store for the Escuela walkthrough.
//! Owns the `Alumnos` table and every rule about student rows.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::StoreConfig;
pub use db::{open_db, open_db_in_memory, DbError, SequenceReset};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::query::{Comparison, StudentFilter, StudentUpdate};
pub use model::student::{NewStudent, Student, StudentId, StudentValidationError};
pub use repo::student_repo::{
    PersistenceError, RepoResult, SqliteStudentRepository, StudentRepository,
};
pub use service::student_service::StudentService;
