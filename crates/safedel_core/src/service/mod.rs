//! Application-facing entry points.
//!
//! # Responsibility
//! - Bundle a document store, the schema registry and an event sink.
//! - Expose per-type accessors returning visibility-tagged queries.
//!
//! # See also
//! - `engine` for what `save`/`delete`/`undelete` do to one document.

pub mod manager;
pub mod safe_deletion_service;

pub use manager::DocumentManager;
pub use safe_deletion_service::SafeDeletionService;
