//! Document policy engine.
//!
//! # Responsibility
//! - Resolve what a `delete` call means for one document and execute it.
//! - Own the alive/soft-deleted transitions, including implicit undelete on
//!   save.
//! - Drive cascade propagation through the query layer.
//!
//! # Invariants
//! - Policy resolution is a pure function of the request and the schema; it
//!   never rewrites a type's declared policy.
//! - Storage failures propagate unchanged. A cascade that fails partway
//!   leaves already-updated dependents updated.

use crate::model::document::DocumentId;
use crate::model::schema::SchemaError;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod cascade;
mod lifecycle;
pub mod policy;

pub use lifecycle::{DeleteOutcome, SaveOptions};
pub use policy::{resolve_delete_policy, ResolvedPolicy};

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by document and query operations.
#[derive(Debug)]
pub enum EngineError {
    Store(StoreError),
    Schema(SchemaError),
    /// `undelete` on a document that is not soft-deleted.
    NotSoftDeleted { kind: String, id: DocumentId },
    /// `delete`/`undelete` on a document that was never saved.
    Unsaved { kind: String },
    DocumentNotFound { kind: String },
    MultipleDocuments { kind: String, count: usize },
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::NotSoftDeleted { kind, id } => {
                write!(f, "{kind} document {id} is not soft-deleted")
            }
            Self::Unsaved { kind } => write!(f, "{kind} document has never been saved"),
            Self::DocumentNotFound { kind } => write!(f, "no {kind} document matches the query"),
            Self::MultipleDocuments { kind, count } => {
                write!(f, "expected one {kind} document, query matched {count}")
            }
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Schema(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<SchemaError> for EngineError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}
