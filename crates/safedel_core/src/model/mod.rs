//! Domain model for soft-deletable documents.
//!
//! # Responsibility
//! - Define documents, deletion policies and visibility modes.
//! - Hold the declared type registry consumed by query and engine layers.
//!
//! # Invariants
//! - A document's policy belongs to its type, never to the instance.
//! - Deletion is a tombstone timestamp unless a policy asks for removal.

pub mod document;
pub mod name;
pub mod policy;
pub mod schema;
