//! SQLite bootstrap for the document store.
//!
//! Opening a connection applies pending migrations and then checks that the
//! `documents` table has the shape the store expects. A connection that
//! passes `verify_documents_schema` is safe to hand to `SqliteDocumentStore`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::{verify_documents_schema, DOCUMENTS_TABLE, DOCUMENT_COLUMNS};

pub type DbResult<T> = Result<T, DbError>;

/// Failures while opening, migrating or checking a document database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Database was written by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
    /// One migration step failed; nothing from the batch was committed.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// `user_version` does not match this build's latest migration.
    NotMigrated { expected: u32, found: u32 },
    MissingTable(&'static str),
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "documents schema v{found} was written by a newer build (this build knows v{supported})"
            ),
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "migration v{version} ({name}) failed: {source}"),
            Self::NotMigrated { expected, found } => write!(
                f,
                "connection is at schema v{found}, document store needs v{expected}"
            ),
            Self::MissingTable(table) => write!(f, "table `{table}` is missing"),
            Self::MissingColumn { table, column } => {
                write!(f, "table `{table}` has no `{column}` column")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(source) | Self::Migration { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
