use safedel_core::db::open_db_in_memory;
use safedel_core::{
    Document, DocumentStore, DocumentValidationError, Predicate, SqliteDocumentStore,
    StoreError, WriteOptions,
};
use serde_json::json;
use uuid::Uuid;

#[test]
fn insert_assigns_identity_and_roundtrips_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let doc = Document::new("category")
        .with_field("name", "books")
        .with_field("rank", 3)
        .with_field("tags", json!(["a", "b"]));
    let id = store.insert_or_update(&doc, &WriteOptions::default()).unwrap();

    let loaded = store.find("category", &[Predicate::id(id)]).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, Some(id));
    assert_eq!(loaded[0].get("name"), Some(&json!("books")));
    assert_eq!(loaded[0].get("rank"), Some(&json!(3)));
    assert_eq!(loaded[0].get("tags"), Some(&json!(["a", "b"])));
    assert_eq!(loaded[0].deleted, None);
}

#[test]
fn upsert_keeps_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let mut first = Document::new("category").with_field("name", "first");
    first.id = Some(store.insert_or_update(&first, &WriteOptions::default()).unwrap());
    let second = Document::new("category").with_field("name", "second");
    store.insert_or_update(&second, &WriteOptions::default()).unwrap();

    first.set("name", "first, renamed");
    first.mark_deleted(99);
    store.insert_or_update(&first, &WriteOptions::default()).unwrap();

    let names: Vec<_> = store
        .find("category", &[])
        .unwrap()
        .into_iter()
        .map(|doc| doc.get("name").cloned().unwrap())
        .collect();
    assert_eq!(names, vec![json!("first, renamed"), json!("second")]);
    assert_eq!(store.count("category", &[Predicate::soft_deleted()]).unwrap(), 1);
}

#[test]
fn force_insert_rejects_existing_identity() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let force = WriteOptions { force_insert: true };

    let mut doc = Document::new("author");
    let id = store.insert_or_update(&doc, &force).unwrap();
    doc.id = Some(id);

    match store.insert_or_update(&doc, &force).unwrap_err() {
        StoreError::Duplicate { kind, id: duplicate } => {
            assert_eq!(kind, "author");
            assert_eq!(duplicate, id);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn kinds_are_separate_collections() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let shared = Uuid::new_v4();
    for kind in ["author", "category"] {
        let mut doc = Document::new(kind);
        doc.id = Some(shared);
        store.insert_or_update(&doc, &WriteOptions::default()).unwrap();
    }

    assert_eq!(store.count("author", &[]).unwrap(), 1);
    assert_eq!(store.count("category", &[Predicate::id(shared)]).unwrap(), 1);
}

#[test]
fn predicates_match_missing_and_null_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    for title in [Some("draft"), Some("final"), None] {
        let mut doc = Document::new("article");
        if let Some(title) = title {
            doc.set("title", title);
        }
        store.insert_or_update(&doc, &WriteOptions::default()).unwrap();
    }

    let count = |filter: Vec<Predicate>| store.count("article", &filter).unwrap();
    assert_eq!(count(vec![Predicate::eq("title", "draft")]), 1);
    assert_eq!(count(vec![Predicate::ne("title", "draft")]), 2);
    assert_eq!(count(vec![Predicate::is_null("title")]), 1);
    assert_eq!(count(vec![Predicate::eq("title", json!(null))]), 1);
    assert_eq!(count(vec![Predicate::not_null("title")]), 2);
    assert_eq!(
        count(vec![
            Predicate::not_null("title"),
            Predicate::ne("title", "final")
        ]),
        1
    );
}

#[test]
fn delete_matching_and_delete_one_remove_rows() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let options = WriteOptions::default();
    let keep = store
        .insert_or_update(&Document::new("article").with_field("keep", true), &options)
        .unwrap();
    for _ in 0..2 {
        let doc = Document::new("article").with_field("keep", false);
        store.insert_or_update(&doc, &options).unwrap();
    }

    let removed = store
        .delete_matching("article", &[Predicate::eq("keep", false)])
        .unwrap();
    assert_eq!(removed, 2);

    store.delete_one("article", keep).unwrap();
    assert_eq!(store.count("article", &[]).unwrap(), 0);

    match store.delete_one("article", keep).unwrap_err() {
        StoreError::NotFound { kind, id } => {
            assert_eq!(kind, "article");
            assert_eq!(id, keep);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_documents_and_fields_never_reach_sql() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let reserved = Document::new("article").with_field("id", "abc");
    assert!(matches!(
        store.insert_or_update(&reserved, &WriteOptions::default()),
        Err(StoreError::Validation(DocumentValidationError::ReservedField(_)))
    ));

    assert!(matches!(
        store.find("article", &[Predicate::eq("title' OR 1=1 --", "x")]),
        Err(StoreError::InvalidField(_))
    ));
}
