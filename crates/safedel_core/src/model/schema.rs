//! Declared document types and the relationship rules between them.
//!
//! # Responsibility
//! - Hold the per-type deletion policy and default visibility.
//! - Hold `(dependent, field) -> owner` reference rules with a cascade flag.
//! - Reject malformed declarations when the registry is built.
//!
//! # Invariants
//! - Lookups never mutate: policy resolution reads a type's policy, it does
//!   not rewrite it.
//! - Rule endpoints always name registered types.

use crate::model::name::{is_reserved_field, is_valid_name, ID_FIELD};
use crate::model::policy::{DeletionPolicy, Visibility};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Per-type soft-deletion declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSchema {
    name: String,
    policy: DeletionPolicy,
    safe_deletion: bool,
    is_abstract: bool,
    visibility: Visibility,
    visibility_field: String,
}

impl DocumentSchema {
    /// Declares a participating type with `SoftDelete` and `Invisible` defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            policy: DeletionPolicy::SoftDelete,
            safe_deletion: true,
            is_abstract: false,
            visibility: Visibility::Invisible,
            visibility_field: ID_FIELD.to_string(),
        }
    }

    /// Declares a type that does not take part in soft deletion.
    ///
    /// Its documents are hard-deleted and always visible.
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            safe_deletion: false,
            policy: DeletionPolicy::HardDelete,
            visibility: Visibility::Visible,
            ..Self::new(name)
        }
    }

    pub fn with_policy(mut self, policy: DeletionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Visibility used by the default accessor.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Field whose presence in a filter escalates `VisibleByField` queries.
    pub fn with_visibility_field(mut self, field: impl Into<String>) -> Self {
        self.visibility_field = field.into();
        self
    }

    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared policy; `HardDelete` for plain types.
    pub fn policy(&self) -> DeletionPolicy {
        if self.safe_deletion {
            self.policy
        } else {
            DeletionPolicy::HardDelete
        }
    }

    pub fn participates(&self) -> bool {
        self.safe_deletion
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Default accessor visibility; `Visible` for plain types.
    pub fn visibility(&self) -> Visibility {
        if self.safe_deletion {
            self.visibility
        } else {
            Visibility::Visible
        }
    }

    pub fn visibility_field(&self) -> &str {
        &self.visibility_field
    }
}

/// Reference from a field of `dependent` documents to an `owner` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipRule {
    pub dependent: String,
    pub field: String,
    pub owner: String,
    pub cascade: bool,
}

/// Schema declaration and lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    InvalidTypeName(String),
    DuplicateType(String),
    InvalidFieldName { kind: String, field: String },
    UnknownType(String),
    DuplicateRule { dependent: String, field: String },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTypeName(name) => write!(f, "invalid document type name `{name}`"),
            Self::DuplicateType(name) => write!(f, "document type already declared: {name}"),
            Self::InvalidFieldName { kind, field } => {
                write!(f, "invalid field name `{field}` on document type `{kind}`")
            }
            Self::UnknownType(name) => write!(f, "unknown document type: {name}"),
            Self::DuplicateRule { dependent, field } => write!(
                f,
                "relationship rule already declared for `{dependent}.{field}`"
            ),
        }
    }
}

impl Error for SchemaError {}

/// Validated, read-only set of document types and relationship rules.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: BTreeMap<String, DocumentSchema>,
    rules: Vec<RelationshipRule>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    /// Looks up one declared type.
    pub fn schema(&self, kind: &str) -> Result<&DocumentSchema, SchemaError> {
        self.types
            .get(kind)
            .ok_or_else(|| SchemaError::UnknownType(kind.to_string()))
    }

    /// Declared type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    /// Rules whose owner is `kind`, in declaration order.
    pub fn rules_for_owner<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = &'a RelationshipRule> + 'a {
        self.rules.iter().filter(move |rule| rule.owner == kind)
    }

    /// Whether any cascade rule points at `kind`.
    pub fn has_cascade_rules(&self, kind: &str) -> bool {
        self.rules_for_owner(kind).any(|rule| rule.cascade)
    }
}

/// Collects declarations and validates them in `build`.
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    types: Vec<DocumentSchema>,
    rules: Vec<RelationshipRule>,
}

impl SchemaRegistryBuilder {
    pub fn register(mut self, schema: DocumentSchema) -> Self {
        self.types.push(schema);
        self
    }

    /// Declares `dependent.field -> owner` with cascade enabled.
    pub fn cascade(
        self,
        dependent: impl Into<String>,
        field: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        self.reference(dependent, field, owner, true)
    }

    /// Declares `dependent.field -> owner` with an explicit cascade flag.
    pub fn reference(
        mut self,
        dependent: impl Into<String>,
        field: impl Into<String>,
        owner: impl Into<String>,
        cascade: bool,
    ) -> Self {
        self.rules.push(RelationshipRule {
            dependent: dependent.into(),
            field: field.into(),
            owner: owner.into(),
            cascade,
        });
        self
    }

    pub fn build(self) -> Result<SchemaRegistry, SchemaError> {
        let mut types = BTreeMap::new();
        for schema in self.types {
            if !is_valid_name(schema.name()) {
                return Err(SchemaError::InvalidTypeName(schema.name().to_string()));
            }
            if !is_valid_name(schema.visibility_field()) {
                return Err(SchemaError::InvalidFieldName {
                    kind: schema.name().to_string(),
                    field: schema.visibility_field().to_string(),
                });
            }
            if types.contains_key(schema.name()) {
                return Err(SchemaError::DuplicateType(schema.name().to_string()));
            }
            types.insert(schema.name().to_string(), schema);
        }

        let mut seen: BTreeSet<(&str, &str)> = BTreeSet::new();
        for rule in &self.rules {
            for kind in [&rule.dependent, &rule.owner] {
                if !types.contains_key(kind.as_str()) {
                    return Err(SchemaError::UnknownType(kind.clone()));
                }
            }
            if !is_valid_name(&rule.field) || is_reserved_field(&rule.field) {
                return Err(SchemaError::InvalidFieldName {
                    kind: rule.dependent.clone(),
                    field: rule.field.clone(),
                });
            }
            if !seen.insert((rule.dependent.as_str(), rule.field.as_str())) {
                return Err(SchemaError::DuplicateRule {
                    dependent: rule.dependent.clone(),
                    field: rule.field.clone(),
                });
            }
        }
        drop(seen);

        Ok(SchemaRegistry {
            types,
            rules: self.rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentSchema, SchemaError, SchemaRegistry};
    use crate::model::policy::{DeletionPolicy, Visibility};

    fn blog_registry() -> SchemaRegistry {
        SchemaRegistry::builder()
            .register(DocumentSchema::new("author").with_policy(DeletionPolicy::HardDeleteNoCascade))
            .register(DocumentSchema::new("category"))
            .register(DocumentSchema::new("article").with_policy(DeletionPolicy::HardDelete))
            .cascade("article", "author", "author")
            .reference("article", "category", "category", false)
            .build()
            .expect("blog schema should build")
    }

    #[test]
    fn cascade_rules_are_looked_up_by_owner() {
        let registry = blog_registry();

        assert!(registry.has_cascade_rules("author"));
        assert!(!registry.has_cascade_rules("category"));
        assert!(!registry.has_cascade_rules("article"));
        assert_eq!(registry.rules_for_owner("category").count(), 1);
    }

    #[test]
    fn plain_types_report_hard_delete_and_full_visibility() {
        let plain = DocumentSchema::plain("audit_log").with_policy(DeletionPolicy::SoftDelete);

        assert!(!plain.participates());
        assert_eq!(plain.policy(), DeletionPolicy::HardDelete);
        assert_eq!(plain.visibility(), Visibility::Visible);
    }

    #[test]
    fn build_rejects_duplicate_types() {
        let err = SchemaRegistry::builder()
            .register(DocumentSchema::new("author"))
            .register(DocumentSchema::new("author"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateType("author".to_string()));
    }

    #[test]
    fn build_rejects_rules_naming_unknown_types() {
        let err = SchemaRegistry::builder()
            .register(DocumentSchema::new("article"))
            .cascade("article", "author", "author")
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::UnknownType("author".to_string()));
    }

    #[test]
    fn build_rejects_reserved_reference_fields_and_duplicate_rules() {
        let reserved = SchemaRegistry::builder()
            .register(DocumentSchema::new("author"))
            .register(DocumentSchema::new("article"))
            .cascade("article", "deleted", "author")
            .build()
            .unwrap_err();
        assert!(matches!(reserved, SchemaError::InvalidFieldName { .. }));

        let duplicate = SchemaRegistry::builder()
            .register(DocumentSchema::new("author"))
            .register(DocumentSchema::new("article"))
            .cascade("article", "author", "author")
            .reference("article", "author", "author", false)
            .build()
            .unwrap_err();
        assert_eq!(
            duplicate,
            SchemaError::DuplicateRule {
                dependent: "article".to_string(),
                field: "author".to_string(),
            }
        );
    }

    #[test]
    fn lookup_of_undeclared_type_fails() {
        let registry = blog_registry();
        assert_eq!(
            registry.schema("comment").unwrap_err(),
            SchemaError::UnknownType("comment".to_string())
        );
        assert_eq!(registry.type_names(), vec!["article", "author", "category"]);
    }
}
