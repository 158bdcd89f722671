#![allow(dead_code)]

use rusqlite::Connection;
use safedel_core::{
    DeletionPolicy, Document, DocumentSchema, DocumentStore, SafeDeletionService, SaveOptions,
    SchemaRegistry, SqliteDocumentStore, Visibility,
};

/// Authors, categories and the articles referencing both.
pub fn blog_registry() -> SchemaRegistry {
    SchemaRegistry::builder()
        .register(DocumentSchema::new("author").with_policy(DeletionPolicy::HardDeleteNoCascade))
        .register(
            DocumentSchema::new("category")
                .with_policy(DeletionPolicy::SoftDelete)
                .with_visibility(Visibility::VisibleByField),
        )
        .register(DocumentSchema::new("article").with_policy(DeletionPolicy::HardDelete))
        .cascade("article", "author", "author")
        .cascade("article", "category", "category")
        .build()
        .unwrap()
}

pub fn sqlite_service(
    conn: &Connection,
    registry: SchemaRegistry,
) -> SafeDeletionService<SqliteDocumentStore<'_>> {
    SafeDeletionService::new(SqliteDocumentStore::try_new(conn).unwrap(), registry)
}

/// Saves a fresh document and returns it with its identity set.
pub fn create<S: DocumentStore>(
    service: &SafeDeletionService<S>,
    mut document: Document,
) -> Document {
    service.save(&mut document, SaveOptions::default()).unwrap();
    document
}

/// `(objects, all_objects, deleted_objects)` counts for `kind`.
pub fn accessor_counts<S: DocumentStore>(
    service: &SafeDeletionService<S>,
    kind: &str,
) -> (usize, usize, usize) {
    let manager = service.manager(kind).unwrap();
    (
        manager.objects().count().unwrap(),
        manager.all_objects().count().unwrap(),
        manager.deleted_objects().count().unwrap(),
    )
}
