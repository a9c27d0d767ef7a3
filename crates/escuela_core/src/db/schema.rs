//! Fixed `Alumnos` schema and autoincrement reset strategies.
//!
//! # Invariants
//! - `ensure_schema` is idempotent and never drops existing rows.
//! - After any `SequenceReset` the next inserted row receives `Id = 1`.

use super::DbResult;
use rusqlite::Connection;

/// Backing table for student rows.
pub const STUDENT_TABLE: &str = "Alumnos";

/// Columns every usable `Alumnos` table must expose.
pub const STUDENT_COLUMNS: &[&str] = &["Id", "Nombre", "Edad"];

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// How `clear_all` brings the autoincrement counter back to its initial value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SequenceReset {
    /// Delete all rows, then drop the table's row from `sqlite_sequence`.
    #[default]
    SqliteSequence,
    /// Drop the table and create it again from the schema.
    RecreateTable,
}

/// Creates the `Alumnos` table when it does not exist yet.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Removes every row and resets the key sequence using `strategy`.
///
/// Runs inside the caller's transaction when one is open. Returns the number
/// of rows that were removed.
pub(crate) fn reset_table(conn: &Connection, strategy: SequenceReset) -> DbResult<usize> {
    match strategy {
        SequenceReset::SqliteSequence => {
            let removed = conn.execute(&format!("DELETE FROM {STUDENT_TABLE};"), [])?;
            conn.execute("DELETE FROM sqlite_sequence WHERE name = ?1;", [STUDENT_TABLE])?;
            Ok(removed)
        }
        SequenceReset::RecreateTable => {
            let removed: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {STUDENT_TABLE};"),
                [],
                |row| row.get(0),
            )?;
            // Dropping an AUTOINCREMENT table also drops its sqlite_sequence row.
            conn.execute_batch(&format!("DROP TABLE IF EXISTS {STUDENT_TABLE};"))?;
            conn.execute_batch(SCHEMA_SQL)?;
            Ok(usize::try_from(removed).unwrap_or_default())
        }
    }
}

/// Returns whether `table` exists in the connected database.
pub(crate) fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Lists column names of `table` in declaration order.
pub(crate) fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}
