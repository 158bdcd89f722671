//! Soft-deletion semantics over a document store.
//!
//! Documents are tombstoned instead of removed, read accessors hide or expose
//! tombstoned documents per type, and deletion can cascade to dependents
//! through declared relationship rules.

pub mod config;
pub mod db;
pub mod engine;
pub mod events;
pub mod logging;
pub mod model;
pub mod query;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use engine::{
    resolve_delete_policy, DeleteOutcome, EngineError, EngineResult, ResolvedPolicy, SaveOptions,
};
pub use events::{EventSink, LogEventSink, RecordingEventSink, UndeleteEvent};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::document::{Document, DocumentId, DocumentState, DocumentValidationError};
pub use model::policy::{
    parse_deletion_policy, parse_visibility, DeletionPolicy, PolicyParseError, Visibility,
    VisibilityParseError,
};
pub use model::schema::{
    DocumentSchema, RelationshipRule, SchemaError, SchemaRegistry, SchemaRegistryBuilder,
};
pub use query::{visibility_predicate, Query, VisibilityState};
pub use service::{DocumentManager, SafeDeletionService};
pub use store::{
    DocumentStore, Predicate, SqliteDocumentStore, StoreError, StoreResult, WriteOptions,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
