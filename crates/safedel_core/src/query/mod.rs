//! Visibility-aware query layer.
//!
//! # Responsibility
//! - Wrap store reads so every executed query sees the visibility predicate
//!   of its mode exactly once.
//! - Route bulk delete/undelete through per-document policy resolution.
//!
//! # Invariants
//! - Query values are immutable: `filter`/`get` derive new values that copy
//!   all visibility state.
//! - A query value belongs to one caller. Concurrent use of the same value
//!   is unsupported; derive or clone a separate value per caller instead.

pub mod queryset;
pub mod visibility;

pub use queryset::Query;
pub use visibility::{visibility_predicate, VisibilityState};
