//! Shape check for the `documents` table.

use super::migrations::{current_version, latest_version};
use super::{DbError, DbResult};
use rusqlite::Connection;

pub const DOCUMENTS_TABLE: &str = "documents";

/// Columns the SQLite store reads or writes.
pub const DOCUMENT_COLUMNS: [&str; 6] = [
    "kind",
    "uuid",
    "body",
    "deleted_at",
    "created_at",
    "updated_at",
];

/// Fails unless `conn` is fully migrated and `documents` has every column in
/// `DOCUMENT_COLUMNS`.
pub fn verify_documents_schema(conn: &Connection) -> DbResult<()> {
    let expected = latest_version();
    let found = current_version(conn)?;
    if found != expected {
        return Err(DbError::NotMigrated { expected, found });
    }

    let columns = table_columns(conn, DOCUMENTS_TABLE)?;
    if columns.is_empty() {
        return Err(DbError::MissingTable(DOCUMENTS_TABLE));
    }
    match DOCUMENT_COLUMNS
        .into_iter()
        .find(|column| !columns.iter().any(|present| present == *column))
    {
        Some(column) => Err(DbError::MissingColumn {
            table: DOCUMENTS_TABLE,
            column,
        }),
        None => Ok(()),
    }
}

/// Column names of `table`; empty when the table does not exist.
fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}
