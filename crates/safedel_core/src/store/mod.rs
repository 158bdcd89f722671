//! Document storage capability and its SQLite implementation.
//!
//! # Responsibility
//! - Define the storage contract the soft-deletion layers are written against.
//! - Isolate SQL details from query and policy orchestration.
//!
//! # Invariants
//! - Stores know nothing about policies or visibility; `deleted` is just a
//!   nullable column to them.
//! - Writes validate documents before touching storage.
//! - Failures are returned unchanged, never retried.

use crate::db::DbError;
use crate::model::document::{Document, DocumentId, DocumentValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod predicate;
pub mod sqlite;

pub use predicate::Predicate;
pub use sqlite::SqliteDocumentStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage errors for document persistence and lookup.
#[derive(Debug)]
pub enum StoreError {
    Validation(DocumentValidationError),
    /// Filter names a field that cannot be addressed.
    InvalidField(String),
    Db(DbError),
    NotFound {
        kind: String,
        id: DocumentId,
    },
    Duplicate {
        kind: String,
        id: DocumentId,
    },
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidField(field) => write!(f, "filter field cannot be addressed: `{field}`"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} document not found: {id}"),
            Self::Duplicate { kind, id } => write!(f, "{kind} document already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted document data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DocumentValidationError> for StoreError {
    fn from(value: DocumentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Pass-through options for write calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Fail with `StoreError::Duplicate` instead of updating an existing row.
    pub force_insert: bool,
}

/// Storage capability consumed by the soft-deletion layers.
///
/// `kind` selects the collection. A filter is a conjunction of predicates.
pub trait DocumentStore {
    /// Returns matching documents in insertion order.
    fn find(&self, kind: &str, filter: &[Predicate]) -> StoreResult<Vec<Document>>;

    /// Persists `document`, assigning an identity when it has none.
    ///
    /// Returns the identity the document is stored under.
    fn insert_or_update(
        &self,
        document: &Document,
        options: &WriteOptions,
    ) -> StoreResult<DocumentId>;

    /// Physically removes matching documents; returns how many were removed.
    fn delete_matching(&self, kind: &str, filter: &[Predicate]) -> StoreResult<usize>;

    /// Physically removes one document.
    fn delete_one(&self, kind: &str, id: DocumentId) -> StoreResult<()>;

    fn count(&self, kind: &str, filter: &[Predicate]) -> StoreResult<usize> {
        Ok(self.find(kind, filter)?.len())
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn find(&self, kind: &str, filter: &[Predicate]) -> StoreResult<Vec<Document>> {
        (**self).find(kind, filter)
    }

    fn insert_or_update(
        &self,
        document: &Document,
        options: &WriteOptions,
    ) -> StoreResult<DocumentId> {
        (**self).insert_or_update(document, options)
    }

    fn delete_matching(&self, kind: &str, filter: &[Predicate]) -> StoreResult<usize> {
        (**self).delete_matching(kind, filter)
    }

    fn delete_one(&self, kind: &str, id: DocumentId) -> StoreResult<()> {
        (**self).delete_one(kind, id)
    }

    fn count(&self, kind: &str, filter: &[Predicate]) -> StoreResult<usize> {
        (**self).count(kind, filter)
    }
}
