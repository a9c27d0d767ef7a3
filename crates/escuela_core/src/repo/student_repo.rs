//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and bulk predicate APIs over the `Alumnos` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Filters and transforms are compiled to bound parameters, never inlined.
//! - `delete_where`/`update_where` never load rows into memory.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::schema::{reset_table, table_columns, table_exists};
use crate::db::{ensure_schema, DbError, SequenceReset, STUDENT_COLUMNS, STUDENT_TABLE};
use crate::model::query::{StudentFilter, StudentUpdate};
use crate::model::student::{NewStudent, Student, StudentId, StudentValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use thiserror::Error;

const STUDENT_SELECT_SQL: &str = "SELECT Id, Nombre, Edad FROM Alumnos";

pub type RepoResult<T> = Result<T, PersistenceError>;

/// Failure surfaced by any record-store operation.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("{0}")]
    Validation(#[from] StudentValidationError),
    #[error("{0}")]
    Db(#[from] DbError),
    #[error("invalid persisted student data: {0}")]
    InvalidData(String),
    #[error("required table `{0}` is missing")]
    MissingRequiredTable(&'static str),
    #[error("required column `{table}.{column}` is missing")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Record-store contract for student rows.
pub trait StudentRepository {
    /// Creates the backing table if absent.
    fn ensure_schema(&self) -> RepoResult<()>;
    /// Deletes every row and resets the key sequence. Returns rows removed.
    fn clear_all(&self) -> RepoResult<usize>;
    fn insert(&self, student: &NewStudent) -> RepoResult<Student>;
    /// Inserts all records atomically, assigning ids in slice order.
    fn insert_many(&self, students: &[NewStudent]) -> RepoResult<Vec<Student>>;
    fn get(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn list_all(&self) -> RepoResult<Vec<Student>>;
    fn find_first(&self, filter: &StudentFilter) -> RepoResult<Option<Student>>;
    fn filter(&self, filter: &StudentFilter) -> RepoResult<Vec<Student>>;
    fn count(&self, filter: &StudentFilter) -> RepoResult<u64>;
    /// Removes the row with `student.id`. Returns `false` if it was already gone.
    fn delete(&self, student: &Student) -> RepoResult<bool>;
    fn delete_where(&self, filter: &StudentFilter) -> RepoResult<usize>;
    fn update_where(&self, filter: &StudentFilter, update: &StudentUpdate) -> RepoResult<usize>;
}

/// SQLite-backed student repository borrowing a caller-owned connection.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
    sequence_reset: SequenceReset,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Wraps `conn` after checking that the `Alumnos` table is usable.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        if !table_exists(conn, STUDENT_TABLE)? {
            return Err(PersistenceError::MissingRequiredTable(STUDENT_TABLE));
        }
        let columns = table_columns(conn, STUDENT_TABLE)?;
        if let Some(missing) = STUDENT_COLUMNS
            .iter()
            .find(|required| !columns.iter().any(|column| column == *required))
        {
            return Err(PersistenceError::MissingRequiredColumn {
                table: STUDENT_TABLE,
                column: *missing,
            });
        }

        Ok(Self {
            conn,
            sequence_reset: SequenceReset::default(),
        })
    }

    /// Selects how `clear_all` resets the autoincrement counter.
    pub fn with_sequence_reset(mut self, strategy: SequenceReset) -> Self {
        self.sequence_reset = strategy;
        self
    }

    fn query_students(
        &self,
        filter: &StudentFilter,
        limit: Option<u32>,
    ) -> RepoResult<Vec<Student>> {
        let mut sql = format!("{STUDENT_SELECT_SQL} WHERE ");
        let mut bind_values = Vec::new();
        push_filter_sql(filter, &mut sql, &mut bind_values);
        sql.push_str(" ORDER BY Id ASC");
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn ensure_schema(&self) -> RepoResult<()> {
        ensure_schema(self.conn)?;
        Ok(())
    }

    fn clear_all(&self) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = reset_table(&tx, self.sequence_reset)?;
        tx.commit()?;
        Ok(removed)
    }

    fn insert(&self, student: &NewStudent) -> RepoResult<Student> {
        student.validate()?;

        self.conn.execute(
            "INSERT INTO Alumnos (Nombre, Edad) VALUES (?1, ?2);",
            params![student.name.as_str(), student.age],
        )?;

        Ok(Student::from_new(self.conn.last_insert_rowid(), student.clone()))
    }

    fn insert_many(&self, students: &[NewStudent]) -> RepoResult<Vec<Student>> {
        for student in students {
            student.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = Vec::with_capacity(students.len());
        {
            let mut stmt = tx.prepare("INSERT INTO Alumnos (Nombre, Edad) VALUES (?1, ?2);")?;
            for student in students {
                stmt.execute(params![student.name.as_str(), student.age])?;
                inserted.push(Student::from_new(tx.last_insert_rowid(), student.clone()));
            }
        }
        tx.commit()?;

        Ok(inserted)
    }

    fn get(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE Id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn list_all(&self) -> RepoResult<Vec<Student>> {
        self.query_students(&StudentFilter::All, None)
    }

    fn find_first(&self, filter: &StudentFilter) -> RepoResult<Option<Student>> {
        Ok(self.query_students(filter, Some(1))?.into_iter().next())
    }

    fn filter(&self, filter: &StudentFilter) -> RepoResult<Vec<Student>> {
        self.query_students(filter, None)
    }

    fn count(&self, filter: &StudentFilter) -> RepoResult<u64> {
        let mut sql = "SELECT COUNT(*) FROM Alumnos WHERE ".to_string();
        let mut bind_values = Vec::new();
        push_filter_sql(filter, &mut sql, &mut bind_values);

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| PersistenceError::InvalidData(format!("negative row count `{count}`")))
    }

    fn delete(&self, student: &Student) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM Alumnos WHERE Id = ?1;", [student.id])?;
        Ok(changed > 0)
    }

    fn delete_where(&self, filter: &StudentFilter) -> RepoResult<usize> {
        let mut sql = "DELETE FROM Alumnos WHERE ".to_string();
        let mut bind_values = Vec::new();
        push_filter_sql(filter, &mut sql, &mut bind_values);

        Ok(self.conn.execute(&sql, params_from_iter(bind_values))?)
    }

    fn update_where(&self, filter: &StudentFilter, update: &StudentUpdate) -> RepoResult<usize> {
        update.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        if let StudentUpdate::IncrementAge(delta) = update {
            ensure_increment_in_range(&tx, filter, *delta)?;
        }

        let mut sql = "UPDATE Alumnos SET ".to_string();
        let mut bind_values = Vec::new();
        push_update_sql(update, &mut sql, &mut bind_values);
        sql.push_str(" WHERE ");
        push_filter_sql(filter, &mut sql, &mut bind_values);

        let updated = tx.execute(&sql, params_from_iter(bind_values))?;
        tx.commit()?;
        Ok(updated)
    }
}

/// Fails when `Edad + delta` would leave the valid range for any matching row.
///
/// Stored ages are non-negative, so a negative `delta` can only underflow
/// below zero and a positive one can only overflow past `i64::MAX`.
fn ensure_increment_in_range(
    conn: &Connection,
    filter: &StudentFilter,
    delta: i64,
) -> RepoResult<()> {
    let mut sql = "SELECT MIN(Edad), MAX(Edad) FROM Alumnos WHERE (".to_string();
    let mut bind_values = Vec::new();
    push_filter_sql(filter, &mut sql, &mut bind_values);
    if delta < 0 {
        sql.push_str(") AND Edad + ? < 0");
        bind_values.push(Value::Integer(delta));
    } else {
        sql.push_str(") AND Edad > ?");
        bind_values.push(Value::Integer(i64::MAX - delta));
    }

    let (lowest, highest): (Option<i64>, Option<i64>) = conn.query_row(
        &sql,
        params_from_iter(bind_values),
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    match (lowest, highest) {
        (Some(age), _) if delta < 0 => {
            Err(StudentValidationError::NegativeAge(age + delta).into())
        }
        (_, Some(age)) => Err(StudentValidationError::AgeOverflow { age, delta }.into()),
        _ => Ok(()),
    }
}

/// Appends `filter` as a parenthesised SQL condition with `?` placeholders.
fn push_filter_sql(filter: &StudentFilter, sql: &mut String, bind_values: &mut Vec<Value>) {
    match filter {
        StudentFilter::All => sql.push_str("1 = 1"),
        StudentFilter::NameEq(name) => {
            sql.push_str("Nombre = ?");
            bind_values.push(Value::Text(name.clone()));
        }
        StudentFilter::Age(op, value) => {
            sql.push_str("Edad ");
            sql.push_str(op.sql_operator());
            sql.push_str(" ?");
            bind_values.push(Value::Integer(*value));
        }
        StudentFilter::And(left, right) => push_binary_sql(left, "AND", right, sql, bind_values),
        StudentFilter::Or(left, right) => push_binary_sql(left, "OR", right, sql, bind_values),
        StudentFilter::Not(inner) => {
            sql.push_str("NOT (");
            push_filter_sql(inner, sql, bind_values);
            sql.push(')');
        }
    }
}

fn push_binary_sql(
    left: &StudentFilter,
    op: &str,
    right: &StudentFilter,
    sql: &mut String,
    bind_values: &mut Vec<Value>,
) {
    sql.push('(');
    push_filter_sql(left, sql, bind_values);
    sql.push_str(") ");
    sql.push_str(op);
    sql.push_str(" (");
    push_filter_sql(right, sql, bind_values);
    sql.push(')');
}

fn push_update_sql(update: &StudentUpdate, sql: &mut String, bind_values: &mut Vec<Value>) {
    match update {
        StudentUpdate::IncrementAge(delta) => {
            sql.push_str("Edad = Edad + ?");
            bind_values.push(Value::Integer(*delta));
        }
        StudentUpdate::SetAge(age) => {
            sql.push_str("Edad = ?");
            bind_values.push(Value::Integer(*age));
        }
        StudentUpdate::Rename(name) => {
            sql.push_str("Nombre = ?");
            bind_values.push(Value::Text(name.clone()));
        }
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let student = Student {
        id: row.get("Id")?,
        name: row.get("Nombre")?,
        age: row.get("Edad")?,
    };
    student.validate().map_err(|err| {
        PersistenceError::InvalidData(format!("row Id={} in Alumnos: {err}", student.id))
    })?;
    Ok(student)
}
