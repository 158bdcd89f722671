//! Visibility filter.
//!
//! Maps a visibility mode to the tombstone predicate a query must AND into its
//! filter, and tracks the per-query visibility decision.
//!
//! # Invariants
//! - A compiled query carries at most one visibility predicate.
//! - Once applied, the decision is frozen: later filters cannot escalate it.
//! - Escalation changes what a query reads, never what it writes.

use crate::model::policy::Visibility;
use crate::store::Predicate;

/// Tombstone predicate for `mode`, `None` when everything is visible.
pub fn visibility_predicate(mode: Visibility) -> Option<Predicate> {
    match mode {
        Visibility::Invisible | Visibility::VisibleByField => Some(Predicate::alive()),
        Visibility::OnlyVisible => Some(Predicate::soft_deleted()),
        Visibility::Visible => None,
    }
}

/// Visibility bookkeeping carried by every query value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityState {
    mode: Visibility,
    field: String,
    escalated: bool,
    applied: bool,
}

impl VisibilityState {
    pub fn new(mode: Visibility, field: impl Into<String>) -> Self {
        Self {
            mode,
            field: field.into(),
            escalated: false,
            applied: false,
        }
    }

    /// Mode the query was created with.
    pub fn mode(&self) -> Visibility {
        self.mode
    }

    /// Mode reads are evaluated with.
    pub fn effective(&self) -> Visibility {
        if self.escalated {
            Visibility::Visible
        } else {
            self.mode
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn is_escalated(&self) -> bool {
        self.escalated
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Escalates `VisibleByField` to `Visible` when `predicate` is an exact
    /// lookup on the designated field. No-op once applied.
    pub fn escalate_for(&mut self, predicate: &Predicate) {
        if self.applied || self.mode != Visibility::VisibleByField {
            return;
        }
        if predicate.is_lookup_on(&self.field) {
            self.escalated = true;
        }
    }

    pub fn mark_applied(&mut self) {
        self.applied = true;
    }

    /// Predicate for reads.
    pub fn read_predicate(&self) -> Option<Predicate> {
        visibility_predicate(self.effective())
    }

    /// Predicate for bulk writes; ignores escalation.
    pub fn write_predicate(&self) -> Option<Predicate> {
        visibility_predicate(self.mode)
    }
}
