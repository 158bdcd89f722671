//! Per-document save/delete/undelete transitions.

use crate::engine::cascade::{self, CascadeAction, CascadeContext};
use crate::engine::policy::{resolve_delete_policy, ResolvedPolicy};
use crate::engine::{EngineError, EngineResult};
use crate::events::UndeleteEvent;
use crate::model::document::{now_epoch_ms, Document, DocumentId};
use crate::model::policy::DeletionPolicy;
use crate::service::SafeDeletionService;
use crate::store::{DocumentStore, WriteOptions};
use log::{debug, info};

/// Options for `SafeDeletionService::save`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Persist the tombstone as-is instead of clearing it.
    ///
    /// Ordinary saves leave this `false`, which makes saving a soft-deleted
    /// document undelete it.
    pub keep_deleted: bool,
    pub write: WriteOptions,
}

impl SaveOptions {
    pub fn preserve_deleted() -> Self {
        Self {
            keep_deleted: true,
            ..Self::default()
        }
    }

    pub fn with_write(mut self, write: WriteOptions) -> Self {
        self.write = write;
        self
    }
}

/// What a `delete` call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// `NoDelete`, or the document was already handled earlier in the call.
    Skipped,
    SoftDeleted,
    HardDeleted,
}

impl DeleteOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::SoftDeleted => "soft_deleted",
            Self::HardDeleted => "hard_deleted",
        }
    }
}

impl<S: DocumentStore> SafeDeletionService<S> {
    /// Persists `document`.
    ///
    /// Unless `options.keep_deleted` is set, the tombstone is cleared first.
    /// When that turns a saved, soft-deleted document alive again an
    /// `UndeleteEvent` is published after the write succeeds. Unsaved
    /// documents never publish.
    ///
    /// On failure the in-memory tombstone is left as it was.
    pub fn save(&self, document: &mut Document, options: SaveOptions) -> EngineResult<DocumentId> {
        self.registry().schema(&document.kind)?;

        let previous_deleted = document.deleted;
        let was_undeleted = !options.keep_deleted && document.is_deleted() && document.is_saved();
        if !options.keep_deleted {
            document.clear_deleted();
        }

        let id = match self.store().insert_or_update(document, &options.write) {
            Ok(id) => id,
            Err(err) => {
                document.deleted = previous_deleted;
                return Err(err.into());
            }
        };
        document.id = Some(id);

        debug!(
            "event=document_save module=engine status=ok kind={} id={} keep_deleted={} deleted={}",
            document.kind,
            id,
            options.keep_deleted,
            document.is_deleted()
        );

        if was_undeleted {
            self.events().publish(&UndeleteEvent::new(document.clone()));
        }
        Ok(id)
    }

    /// Deletes `document` according to `policy`, or its type's policy.
    ///
    /// Plain (non-participating) types are always hard-deleted.
    ///
    /// # Errors
    /// - `Unsaved` when the document was never saved.
    /// - `Schema` when its type is not declared.
    /// - Storage failures, unchanged.
    pub fn delete(
        &self,
        document: &mut Document,
        policy: Option<DeletionPolicy>,
        options: &WriteOptions,
    ) -> EngineResult<DeleteOutcome> {
        let mut context = CascadeContext::new(now_epoch_ms());
        self.delete_in(document, policy, options, &mut context)
    }

    /// Brings a soft-deleted `document` back.
    ///
    /// With a `SoftDeleteCascade` policy, cascade-linked dependents are
    /// undeleted after this document is persisted. Every restored dependent
    /// goes through `save`, so the sink receives one `UndeleteEvent` for this
    /// document followed by one per dependent.
    ///
    /// # Errors
    /// - `NotSoftDeleted` when the document is alive.
    /// - `Unsaved` when the document was never saved.
    pub fn undelete(
        &self,
        document: &mut Document,
        policy: Option<DeletionPolicy>,
        options: &WriteOptions,
    ) -> EngineResult<()> {
        let mut context = CascadeContext::new(now_epoch_ms());
        self.undelete_in(document, policy, options, &mut context)
    }

    pub(crate) fn delete_in(
        &self,
        document: &mut Document,
        policy: Option<DeletionPolicy>,
        options: &WriteOptions,
        context: &mut CascadeContext,
    ) -> EngineResult<DeleteOutcome> {
        let schema = self.registry().schema(&document.kind)?;
        let Some(id) = document.id else {
            return Err(EngineError::Unsaved {
                kind: document.kind.clone(),
            });
        };
        if !context.visit(&document.kind, id) {
            return Ok(DeleteOutcome::Skipped);
        }

        let requested = if schema.participates() {
            policy.unwrap_or(schema.policy())
        } else {
            DeletionPolicy::HardDelete
        };
        let resolved = resolve_delete_policy(
            requested,
            schema.policy(),
            self.registry().has_cascade_rules(&document.kind),
        );

        let outcome = match resolved {
            ResolvedPolicy::NoDelete => DeleteOutcome::Skipped,
            ResolvedPolicy::SoftDelete => {
                self.persist_tombstone(document, context.now(), options)?;
                DeleteOutcome::SoftDeleted
            }
            ResolvedPolicy::SoftDeleteCascade => {
                cascade::propagate(self, document, CascadeAction::Delete, options, context)?;
                self.persist_tombstone(document, context.now(), options)?;
                DeleteOutcome::SoftDeleted
            }
            ResolvedPolicy::HardDelete => {
                self.store().delete_one(&document.kind, id)?;
                DeleteOutcome::HardDeleted
            }
        };

        info!(
            "event=document_delete module=engine status=ok kind={} id={} requested={} resolved={} outcome={}",
            document.kind,
            id,
            requested,
            resolved.as_str(),
            outcome.as_str()
        );
        Ok(outcome)
    }

    pub(crate) fn undelete_in(
        &self,
        document: &mut Document,
        policy: Option<DeletionPolicy>,
        options: &WriteOptions,
        context: &mut CascadeContext,
    ) -> EngineResult<()> {
        let schema = self.registry().schema(&document.kind)?;
        let Some(id) = document.id else {
            return Err(EngineError::Unsaved {
                kind: document.kind.clone(),
            });
        };
        if !document.is_deleted() {
            return Err(EngineError::NotSoftDeleted {
                kind: document.kind.clone(),
                id,
            });
        }
        if !context.visit(&document.kind, id) {
            return Ok(());
        }

        let resolved = policy.unwrap_or(schema.policy());
        self.save(
            document,
            SaveOptions {
                keep_deleted: false,
                write: *options,
            },
        )?;

        if resolved == DeletionPolicy::SoftDeleteCascade {
            cascade::propagate(self, document, CascadeAction::Undelete, options, context)?;
        }

        info!(
            "event=document_undelete module=engine status=ok kind={} id={} policy={}",
            document.kind, id, resolved
        );
        Ok(())
    }

    fn persist_tombstone(
        &self,
        document: &mut Document,
        at_epoch_ms: i64,
        options: &WriteOptions,
    ) -> EngineResult<()> {
        let previous_deleted = document.deleted;
        document.mark_deleted(at_epoch_ms);
        let save_options = SaveOptions::preserve_deleted().with_write(*options);
        if let Err(err) = self.save(document, save_options) {
            document.deleted = previous_deleted;
            return Err(err);
        }
        Ok(())
    }
}
