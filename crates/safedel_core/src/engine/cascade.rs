//! Cascade traverser.
//!
//! Walks the relationship rules owned by one document's type and applies the
//! same transition to dependents through the query layer. One level per call:
//! deeper levels happen when a dependent's own policy cascades again.

use crate::engine::policy::cascade_policy_for;
use crate::engine::EngineResult;
use crate::model::document::{Document, DocumentId};
use crate::model::policy::Visibility;
use crate::service::SafeDeletionService;
use crate::store::{DocumentStore, Predicate, WriteOptions};
use log::{debug, info};
use std::collections::HashSet;

/// Transition applied to dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeAction {
    Delete,
    Undelete,
}

impl CascadeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Undelete => "undelete",
        }
    }

    /// Dependents a transition applies to: alive ones for delete, tombstoned
    /// ones for undelete.
    fn visibility(self) -> Visibility {
        match self {
            Self::Delete => Visibility::Invisible,
            Self::Undelete => Visibility::OnlyVisible,
        }
    }
}

/// State shared by every document touched by one top-level call.
#[derive(Debug)]
pub struct CascadeContext {
    now: i64,
    visited: HashSet<(String, DocumentId)>,
}

impl CascadeContext {
    pub fn new(now_epoch_ms: i64) -> Self {
        Self {
            now: now_epoch_ms,
            visited: HashSet::new(),
        }
    }

    /// Timestamp every soft delete of this call is stamped with.
    pub fn now(&self) -> i64 {
        self.now
    }

    /// Records a visit; returns `false` when the document was already handled.
    pub fn visit(&mut self, kind: &str, id: DocumentId) -> bool {
        self.visited.insert((kind.to_string(), id))
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

/// Applies `action` to every cascade-linked dependent of `owner`.
///
/// Rules without the cascade flag are ignored. Rules whose dependent type is
/// plain or abstract are skipped silently. Returns how many dependents were
/// matched.
pub(crate) fn propagate<S: DocumentStore>(
    service: &SafeDeletionService<S>,
    owner: &Document,
    action: CascadeAction,
    options: &WriteOptions,
    context: &mut CascadeContext,
) -> EngineResult<usize> {
    let registry = service.registry();
    let mut matched = 0;

    for rule in registry.rules_for_owner(&owner.kind) {
        if !rule.cascade {
            continue;
        }

        let dependent = registry.schema(&rule.dependent)?;
        if !dependent.participates() || dependent.is_abstract() {
            debug!(
                "event=cascade_skip module=cascade status=skipped owner={} dependent={} field={} participates={} abstract={}",
                owner.kind,
                rule.dependent,
                rule.field,
                dependent.participates(),
                dependent.is_abstract()
            );
            continue;
        }

        let policy = cascade_policy_for(dependent.policy());
        let query = service
            .all(&rule.dependent, Some(action.visibility()))?
            .filter(Predicate::references(rule.field.as_str(), owner));

        let mut documents = query.fetch()?;
        for document in &mut documents {
            match action {
                CascadeAction::Delete => {
                    service.delete_in(document, Some(policy), options, context)?;
                }
                CascadeAction::Undelete => {
                    service.undelete_in(document, Some(policy), options, context)?;
                }
            }
        }

        info!(
            "event=cascade_propagate module=cascade status=ok action={} owner={} dependent={} field={} policy={} count={}",
            action.as_str(),
            owner.kind,
            rule.dependent,
            rule.field,
            policy,
            documents.len()
        );
        matched += documents.len();
    }

    Ok(matched)
}
