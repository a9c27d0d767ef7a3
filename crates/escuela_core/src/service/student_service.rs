//! Student use-case service.
//!
//! # Responsibility
//! - Provide the record-store entry points used by the driver.
//! - Emit metadata-only diagnostic events for destructive operations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Returned records are snapshots; callers re-fetch after bulk mutations.

use crate::model::query::{StudentFilter, StudentUpdate};
use crate::model::student::{NewStudent, Student, StudentId};
use crate::repo::student_repo::{RepoResult, StudentRepository};
use log::{debug, info};

/// Use-case wrapper around a `StudentRepository`.
pub struct StudentService<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> StudentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates the backing table if absent. Safe to call repeatedly.
    pub fn ensure_schema(&self) -> RepoResult<()> {
        self.repo.ensure_schema()
    }

    /// Deletes every student and restarts id numbering at 1.
    pub fn clear_all(&self) -> RepoResult<usize> {
        let removed = self.repo.clear_all()?;
        info!("event=students_clear module=service status=ok removed={removed}");
        Ok(removed)
    }

    pub fn insert(&self, student: &NewStudent) -> RepoResult<Student> {
        let inserted = self.repo.insert(student)?;
        debug!("event=students_insert module=service status=ok id={}", inserted.id);
        Ok(inserted)
    }

    pub fn insert_many(&self, students: &[NewStudent]) -> RepoResult<Vec<Student>> {
        let inserted = self.repo.insert_many(students)?;
        info!(
            "event=students_insert_many module=service status=ok count={}",
            inserted.len()
        );
        Ok(inserted)
    }

    pub fn get(&self, id: StudentId) -> RepoResult<Option<Student>> {
        self.repo.get(id)
    }

    /// All students in id order, as of the call.
    pub fn list_all(&self) -> RepoResult<Vec<Student>> {
        self.repo.list_all()
    }

    pub fn find_first(&self, filter: &StudentFilter) -> RepoResult<Option<Student>> {
        self.repo.find_first(filter)
    }

    pub fn filter(&self, filter: &StudentFilter) -> RepoResult<Vec<Student>> {
        self.repo.filter(filter)
    }

    pub fn count(&self, filter: &StudentFilter) -> RepoResult<u64> {
        self.repo.count(filter)
    }

    /// Removes one student by identity; a missing row is not an error.
    pub fn delete(&self, student: &Student) -> RepoResult<bool> {
        let removed = self.repo.delete(student)?;
        info!(
            "event=students_delete module=service status=ok id={} removed={removed}",
            student.id
        );
        Ok(removed)
    }

    /// Deletes all matching rows inside storage. Earlier snapshots of those
    /// rows are orphaned.
    pub fn delete_where(&self, filter: &StudentFilter) -> RepoResult<usize> {
        let removed = self.repo.delete_where(filter)?;
        info!("event=students_delete_where module=service status=ok removed={removed}");
        Ok(removed)
    }

    /// Applies `update` to all matching rows inside storage. Earlier
    /// snapshots keep their old values.
    pub fn update_where(
        &self,
        filter: &StudentFilter,
        update: &StudentUpdate,
    ) -> RepoResult<usize> {
        let updated = self.repo.update_where(filter, update)?;
        info!("event=students_update_where module=service status=ok updated={updated}");
        Ok(updated)
    }
}
