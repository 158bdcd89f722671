//! Document domain model.
//!
//! # Responsibility
//! - Define the record every soft-deletion participant is stored as.
//! - Provide lifecycle helpers for the alive/soft-deleted state machine.
//!
//! # Invariants
//! - `deleted.is_some()` is the source of truth for tombstone state.
//! - `id` is `None` until the first save and never changes afterwards.
//! - `fields` never carries the reserved `id`/`deleted` names.

use crate::model::name::{is_reserved_field, is_valid_name};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identity of a stored document.
pub type DocumentId = Uuid;

/// Lifecycle state of a persisted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Alive,
    SoftDeleted,
}

/// One stored document of a declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Declared type name; also the collection the document lives in.
    pub kind: String,
    /// Assigned by the first save.
    pub id: Option<DocumentId>,
    /// Application payload.
    #[serde(default)]
    pub fields: Map<String, Value>,
    /// Unix epoch milliseconds of the soft delete, `None` while alive.
    #[serde(default)]
    pub deleted: Option<i64>,
}

impl Document {
    /// Creates an unsaved, alive document of `kind` with no fields.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            fields: Map::new(),
            deleted: None,
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Builder-style reference to another saved document.
    ///
    /// Stores the owner identity, or `null` when the owner was never saved.
    pub fn with_reference(self, name: impl Into<String>, owner: &Document) -> Self {
        let value = owner.reference_value();
        self.with_field(name, value)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Value other documents store to reference this one.
    pub fn reference_value(&self) -> Value {
        self.id
            .map(|id| Value::String(id.to_string()))
            .unwrap_or(Value::Null)
    }

    /// Whether the document has been persisted at least once.
    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }

    pub fn state(&self) -> DocumentState {
        if self.is_deleted() {
            DocumentState::SoftDeleted
        } else {
            DocumentState::Alive
        }
    }

    /// Stamps the tombstone. Does not persist.
    pub fn mark_deleted(&mut self, at_epoch_ms: i64) {
        self.deleted = Some(at_epoch_ms);
    }

    /// Clears the tombstone. Does not persist.
    pub fn clear_deleted(&mut self) {
        self.deleted = None;
    }

    /// Checks naming invariants before the document reaches storage.
    pub fn validate(&self) -> Result<(), DocumentValidationError> {
        if !is_valid_name(&self.kind) {
            return Err(DocumentValidationError::InvalidKind(self.kind.clone()));
        }
        if self.id.is_some_and(|id| id.is_nil()) {
            return Err(DocumentValidationError::NilId);
        }
        for name in self.fields.keys() {
            if is_reserved_field(name) {
                return Err(DocumentValidationError::ReservedField(name.clone()));
            }
            if !is_valid_name(name) {
                return Err(DocumentValidationError::InvalidFieldName(name.clone()));
            }
        }
        Ok(())
    }
}

/// Document shape violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentValidationError {
    InvalidKind(String),
    NilId,
    ReservedField(String),
    InvalidFieldName(String),
}

impl Display for DocumentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKind(kind) => write!(f, "invalid document kind `{kind}`"),
            Self::NilId => write!(f, "document id must not be nil uuid"),
            Self::ReservedField(name) => {
                write!(f, "field name `{name}` is reserved for soft-deletion bookkeeping")
            }
            Self::InvalidFieldName(name) => write!(f, "invalid field name `{name}`"),
        }
    }
}

impl Error for DocumentValidationError {}

/// Current wall clock as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{Document, DocumentState, DocumentValidationError};
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn new_document_is_unsaved_and_alive() {
        let doc = Document::new("category").with_field("name", "books");

        assert!(!doc.is_saved());
        assert_eq!(doc.state(), DocumentState::Alive);
        assert_eq!(doc.get("name"), Some(&json!("books")));
        assert_eq!(doc.reference_value(), json!(null));
    }

    #[test]
    fn mark_and_clear_deleted_drive_state() {
        let mut doc = Document::new("category");

        doc.mark_deleted(1_700_000_000_000);
        assert_eq!(doc.state(), DocumentState::SoftDeleted);

        doc.clear_deleted();
        assert_eq!(doc.state(), DocumentState::Alive);
    }

    #[test]
    fn validate_rejects_reserved_and_malformed_names() {
        let reserved = Document::new("article").with_field("deleted", true);
        assert_eq!(
            reserved.validate(),
            Err(DocumentValidationError::ReservedField("deleted".to_string()))
        );

        let malformed = Document::new("article").with_field("a-b", 1);
        assert_eq!(
            malformed.validate(),
            Err(DocumentValidationError::InvalidFieldName("a-b".to_string()))
        );

        let bad_kind = Document::new("no spaces");
        assert!(matches!(
            bad_kind.validate(),
            Err(DocumentValidationError::InvalidKind(_))
        ));
    }

    #[test]
    fn validate_rejects_nil_identity() {
        let mut doc = Document::new("article");
        doc.id = Some(Uuid::nil());
        assert_eq!(doc.validate(), Err(DocumentValidationError::NilId));
    }

    #[test]
    fn serialization_uses_expected_wire_fields() {
        let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
        let mut doc = Document::new("category").with_field("name", "news");
        doc.id = Some(id);
        doc.mark_deleted(42);

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["kind"], "category");
        assert_eq!(value["id"], id.to_string());
        assert_eq!(value["deleted"], 42);
        assert_eq!(value["fields"]["name"], "news");

        let decoded: Document = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, doc);
    }
}
