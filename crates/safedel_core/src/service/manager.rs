//! Accessor facade for one document type.

use crate::model::policy::Visibility;
use crate::model::schema::DocumentSchema;
use crate::query::{Query, VisibilityState};
use crate::service::SafeDeletionService;
use crate::store::DocumentStore;

/// The three visibility presets of one document type.
///
/// Every call returns a fresh, independent query.
pub struct DocumentManager<'s, S: DocumentStore> {
    service: &'s SafeDeletionService<S>,
    schema: &'s DocumentSchema,
}

impl<'s, S: DocumentStore> DocumentManager<'s, S> {
    pub(crate) fn new(service: &'s SafeDeletionService<S>, schema: &'s DocumentSchema) -> Self {
        Self { service, schema }
    }

    pub fn schema(&self) -> &'s DocumentSchema {
        self.schema
    }

    /// Declared visibility; `Invisible` unless the type says otherwise.
    pub fn objects(&self) -> Query<'s, S> {
        self.query(self.schema.visibility())
    }

    pub fn all_objects(&self) -> Query<'s, S> {
        self.query(Visibility::Visible)
    }

    pub fn deleted_objects(&self) -> Query<'s, S> {
        self.query(Visibility::OnlyVisible)
    }

    /// Declared visibility, unless `force_visibility` overrides it.
    ///
    /// Meant for relationship traversal, which has no access to the presets.
    pub fn all(&self, force_visibility: Option<Visibility>) -> Query<'s, S> {
        self.query(force_visibility.unwrap_or(self.schema.visibility()))
    }

    fn query(&self, mode: Visibility) -> Query<'s, S> {
        Query::new(
            self.service,
            self.schema.name(),
            VisibilityState::new(mode, self.schema.visibility_field()),
        )
    }
}
