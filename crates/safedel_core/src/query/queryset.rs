//! Lazily evaluated, visibility-tagged queries.

use crate::engine::cascade::CascadeContext;
use crate::engine::{EngineError, EngineResult};
use crate::model::document::{now_epoch_ms, Document};
use crate::model::policy::{DeletionPolicy, Visibility};
use crate::query::visibility::VisibilityState;
use crate::service::SafeDeletionService;
use crate::store::{DocumentStore, Predicate, WriteOptions};
use log::info;

/// Query over one document type, tagged with a visibility mode.
///
/// Nothing touches storage until `fetch`, `count`, `first`, `get`,
/// `delete_all` or `undelete_all` runs.
pub struct Query<'s, S: DocumentStore> {
    service: &'s SafeDeletionService<S>,
    kind: &'s str,
    filters: Vec<Predicate>,
    visibility: VisibilityState,
}

impl<S: DocumentStore> Clone for Query<'_, S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service,
            kind: self.kind,
            filters: self.filters.clone(),
            visibility: self.visibility.clone(),
        }
    }
}

impl<S: DocumentStore> std::fmt::Debug for Query<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("kind", &self.kind)
            .field("filters", &self.filters)
            .field("visibility", &self.visibility)
            .finish()
    }
}

impl<'s, S: DocumentStore> Query<'s, S> {
    pub(crate) fn new(
        service: &'s SafeDeletionService<S>,
        kind: &'s str,
        visibility: VisibilityState,
    ) -> Self {
        Self {
            service,
            kind,
            filters: Vec::new(),
            visibility,
        }
    }

    pub fn kind(&self) -> &str {
        self.kind
    }

    /// Mode reads are currently evaluated with.
    pub fn visibility(&self) -> Visibility {
        self.visibility.effective()
    }

    pub fn visibility_state(&self) -> &VisibilityState {
        &self.visibility
    }

    /// Derives a query narrowed by `predicate`.
    ///
    /// Under `VisibleByField`, a predicate on the designated field makes the
    /// derived query see soft-deleted documents too.
    pub fn filter(&self, predicate: Predicate) -> Self {
        let mut derived = self.clone();
        derived.visibility.escalate_for(&predicate);
        derived.filters.push(predicate);
        derived
    }

    /// Derives a query narrowed by every predicate in `predicates`.
    pub fn filter_all(&self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        predicates
            .into_iter()
            .fold(self.clone(), |query, predicate| query.filter(predicate))
    }

    /// Derives a query whose visibility decision is frozen.
    pub fn apply_visibility(&self) -> Self {
        let mut derived = self.clone();
        derived.visibility.mark_applied();
        derived
    }

    /// Filter handed to storage for reads: user predicates plus one
    /// visibility predicate.
    pub fn compiled_filter(&self) -> Vec<Predicate> {
        let mut compiled = self.filters.clone();
        compiled.extend(self.visibility.read_predicate());
        compiled
    }

    fn write_filter(&self) -> Vec<Predicate> {
        let mut compiled = self.filters.clone();
        compiled.extend(self.visibility.write_predicate());
        compiled
    }

    pub fn fetch(&self) -> EngineResult<Vec<Document>> {
        Ok(self
            .service
            .store()
            .find(self.kind, &self.compiled_filter())?)
    }

    /// Executes the query and returns an owning iterator over the results.
    pub fn iter(&self) -> EngineResult<std::vec::IntoIter<Document>> {
        Ok(self.fetch()?.into_iter())
    }

    pub fn count(&self) -> EngineResult<usize> {
        Ok(self
            .service
            .store()
            .count(self.kind, &self.compiled_filter())?)
    }

    pub fn exists(&self) -> EngineResult<bool> {
        Ok(self.count()? > 0)
    }

    pub fn first(&self) -> EngineResult<Option<Document>> {
        Ok(self.fetch()?.into_iter().next())
    }

    /// Returns the single document matching `predicate`.
    ///
    /// # Errors
    /// - `DocumentNotFound` when nothing matches.
    /// - `MultipleDocuments` when more than one document matches.
    pub fn get(&self, predicate: Predicate) -> EngineResult<Document> {
        let mut documents = self.filter(predicate).fetch()?;
        match documents.len() {
            0 => Err(EngineError::DocumentNotFound {
                kind: self.kind.to_string(),
            }),
            1 => Ok(documents.remove(0)),
            count => Err(EngineError::MultipleDocuments {
                kind: self.kind.to_string(),
                count,
            }),
        }
    }

    /// Deletes every matching document.
    ///
    /// A resolved `HardDelete` is one bulk storage delete. Anything else is
    /// applied document by document so policy and cascade run per document.
    /// Matching ignores `VisibleByField` escalation.
    ///
    /// Returns how many documents were matched.
    pub fn delete_all(
        &self,
        policy: Option<DeletionPolicy>,
        options: &WriteOptions,
    ) -> EngineResult<usize> {
        let schema = self.service.registry().schema(self.kind)?;
        let requested = policy.unwrap_or(schema.policy());

        if requested == DeletionPolicy::HardDelete {
            let removed = self
                .service
                .store()
                .delete_matching(self.kind, &self.write_filter())?;
            info!(
                "event=query_delete_all module=query status=ok kind={} policy={} mode=bulk count={}",
                self.kind, requested, removed
            );
            return Ok(removed);
        }

        let mut documents = self.service.store().find(self.kind, &self.write_filter())?;
        let mut context = CascadeContext::new(now_epoch_ms());
        for document in &mut documents {
            self.service
                .delete_in(document, policy, options, &mut context)?;
        }

        info!(
            "event=query_delete_all module=query status=ok kind={} policy={} mode=per_document count={}",
            self.kind,
            requested,
            documents.len()
        );
        Ok(documents.len())
    }

    /// Undeletes every matching document.
    ///
    /// Every match must be soft-deleted; an alive match fails the whole call
    /// with `NotSoftDeleted` after the earlier matches were undeleted.
    pub fn undelete_all(
        &self,
        policy: Option<DeletionPolicy>,
        options: &WriteOptions,
    ) -> EngineResult<usize> {
        let mut documents = self.service.store().find(self.kind, &self.write_filter())?;
        let mut context = CascadeContext::new(now_epoch_ms());
        for document in &mut documents {
            self.service
                .undelete_in(document, policy, options, &mut context)?;
        }

        info!(
            "event=query_undelete_all module=query status=ok kind={} count={}",
            self.kind,
            documents.len()
        );
        Ok(documents.len())
    }
}
