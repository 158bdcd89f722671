//! Filter predicates understood by every document store.
//!
//! A filter is a conjunction: `&[Predicate]` matches documents satisfying
//! every element. This is deliberately not a query language.

use crate::model::document::{Document, DocumentId};
use crate::model::name::{DELETED_FIELD, ID_FIELD};
use serde_json::Value;

/// One field condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Field equals value; `null` matches missing fields too.
    Eq { field: String, value: Value },
    /// Field differs from value; missing fields match.
    Ne { field: String, value: Value },
    IsNull(String),
    NotNull(String),
}

impl Predicate {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Ne {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::IsNull(field.into())
    }

    pub fn not_null(field: impl Into<String>) -> Self {
        Self::NotNull(field.into())
    }

    /// Identity lookup.
    pub fn id(id: DocumentId) -> Self {
        Self::eq(ID_FIELD, id.to_string())
    }

    /// Documents whose `field` references `owner`.
    pub fn references(field: impl Into<String>, owner: &Document) -> Self {
        Self::eq(field, owner.reference_value())
    }

    /// Alive documents only.
    pub fn alive() -> Self {
        Self::is_null(DELETED_FIELD)
    }

    /// Soft-deleted documents only.
    pub fn soft_deleted() -> Self {
        Self::not_null(DELETED_FIELD)
    }

    pub fn field(&self) -> &str {
        match self {
            Self::Eq { field, .. } | Self::Ne { field, .. } => field,
            Self::IsNull(field) | Self::NotNull(field) => field,
        }
    }

    pub fn references_field(&self, name: &str) -> bool {
        self.field() == name
    }

    /// Whether this is an exact, non-null lookup on `name`.
    pub fn is_lookup_on(&self, name: &str) -> bool {
        matches!(self, Self::Eq { field, value } if field == name && !value.is_null())
    }

    /// Whether this predicate constrains the tombstone field.
    pub fn is_visibility_predicate(&self) -> bool {
        self.references_field(DELETED_FIELD)
    }
}

#[cfg(test)]
mod tests {
    use super::Predicate;
    use crate::model::document::Document;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn id_predicate_targets_identity_field() {
        let id = Uuid::new_v4();
        let predicate = Predicate::id(id);

        assert!(predicate.references_field("id"));
        assert_eq!(predicate, Predicate::eq("id", id.to_string()));
    }

    #[test]
    fn only_non_null_equality_is_a_lookup() {
        assert!(Predicate::eq("id", "abc").is_lookup_on("id"));
        assert!(!Predicate::eq("id", serde_json::Value::Null).is_lookup_on("id"));
        assert!(!Predicate::ne("id", "abc").is_lookup_on("id"));
        assert!(!Predicate::not_null("id").is_lookup_on("id"));
        assert!(!Predicate::is_null("id").is_lookup_on("id"));
        assert!(!Predicate::eq("name", "abc").is_lookup_on("id"));
    }

    #[test]
    fn references_uses_owner_identity() {
        let mut owner = Document::new("author");
        let id = Uuid::new_v4();
        owner.id = Some(id);

        assert_eq!(
            Predicate::references("author", &owner),
            Predicate::eq("author", json!(id.to_string()))
        );
    }

    #[test]
    fn tombstone_predicates_are_visibility_predicates() {
        assert!(Predicate::alive().is_visibility_predicate());
        assert!(Predicate::soft_deleted().is_visibility_predicate());
        assert!(!Predicate::eq("name", "x").is_visibility_predicate());
    }
}
