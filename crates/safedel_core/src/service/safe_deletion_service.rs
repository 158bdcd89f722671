//! Soft-deletion service over one document store.

use crate::engine::EngineResult;
use crate::events::{EventSink, LogEventSink};
use crate::model::policy::Visibility;
use crate::model::schema::SchemaRegistry;
use crate::query::Query;
use crate::service::manager::DocumentManager;
use crate::store::DocumentStore;
use std::sync::Arc;

/// Soft-deletion layer over a `DocumentStore`.
///
/// Document operations (`save`, `delete`, `undelete`) live in the engine
/// module; this type owns the collaborators and the accessor facade.
pub struct SafeDeletionService<S: DocumentStore> {
    store: S,
    registry: SchemaRegistry,
    events: Arc<dyn EventSink>,
}

impl<S: DocumentStore> SafeDeletionService<S> {
    /// Creates a service that reports undeletes to the log.
    pub fn new(store: S, registry: SchemaRegistry) -> Self {
        Self {
            store,
            registry,
            events: Arc::new(LogEventSink),
        }
    }

    /// Replaces the undelete event sink.
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub(crate) fn events(&self) -> &dyn EventSink {
        self.events.as_ref()
    }

    /// Per-type accessor bundle.
    pub fn manager(&self, kind: &str) -> EngineResult<DocumentManager<'_, S>> {
        let schema = self.registry.schema(kind)?;
        Ok(DocumentManager::new(self, schema))
    }

    /// Default accessor: the type's declared visibility.
    pub fn objects(&self, kind: &str) -> EngineResult<Query<'_, S>> {
        Ok(self.manager(kind)?.objects())
    }

    /// Every document, soft-deleted or not.
    pub fn all_objects(&self, kind: &str) -> EngineResult<Query<'_, S>> {
        Ok(self.manager(kind)?.all_objects())
    }

    /// Soft-deleted documents only.
    pub fn deleted_objects(&self, kind: &str) -> EngineResult<Query<'_, S>> {
        Ok(self.manager(kind)?.deleted_objects())
    }

    /// Default accessor with an optional visibility override.
    pub fn all(
        &self,
        kind: &str,
        force_visibility: Option<Visibility>,
    ) -> EngineResult<Query<'_, S>> {
        Ok(self.manager(kind)?.all(force_visibility))
    }
}
