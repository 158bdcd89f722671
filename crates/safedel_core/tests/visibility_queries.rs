mod common;

use common::{accessor_counts, blog_registry, create, sqlite_service};
use safedel_core::db::open_db_in_memory;
use safedel_core::{
    DeletionPolicy, Document, DocumentSchema, EngineError, Predicate, SchemaRegistry, Visibility,
    WriteOptions,
};

#[test]
fn soft_deleted_category_moves_to_deleted_accessor() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_service(&conn, blog_registry());

    let mut c1 = create(&service, Document::new("category").with_field("name", "c1"));
    create(&service, Document::new("category").with_field("name", "c2"));
    service.delete(&mut c1, None, &WriteOptions::default()).unwrap();
    let c1_id = c1.id.unwrap();

    let by_name = service
        .objects("category")
        .unwrap()
        .filter(Predicate::eq("name", "c1"))
        .fetch()
        .unwrap();
    assert!(by_name.is_empty());

    let deleted = service
        .deleted_objects("category")
        .unwrap()
        .filter(Predicate::id(c1_id))
        .fetch()
        .unwrap();
    assert_eq!(deleted, vec![c1.clone()]);

    let fetched = service
        .objects("category")
        .unwrap()
        .get(Predicate::id(c1_id))
        .unwrap();
    assert_eq!(fetched, c1);

    assert_eq!(accessor_counts(&service, "category"), (1, 2, 1));
}

#[test]
fn identity_filter_escalates_only_the_derived_query() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_service(&conn, blog_registry());

    let mut c1 = create(&service, Document::new("category"));
    service.delete(&mut c1, None, &WriteOptions::default()).unwrap();

    let objects = service.objects("category").unwrap();
    let by_id = objects.filter(Predicate::id(c1.id.unwrap()));

    assert_eq!(by_id.visibility(), Visibility::Visible);
    assert_eq!(by_id.count().unwrap(), 1);
    assert_eq!(objects.visibility(), Visibility::VisibleByField);
    assert_eq!(objects.count().unwrap(), 0);
}

#[test]
fn non_lookup_identity_predicates_keep_deleted_documents_hidden() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_service(&conn, blog_registry());

    let mut c1 = create(&service, Document::new("category").with_field("name", "c1"));
    let c2 = create(&service, Document::new("category").with_field("name", "c2"));
    service.delete(&mut c1, None, &WriteOptions::default()).unwrap();

    let objects = service.objects("category").unwrap();
    let not_c2 = objects.filter(Predicate::ne("id", c2.id.unwrap().to_string()));
    assert_eq!(not_c2.visibility(), Visibility::VisibleByField);
    assert!(not_c2.fetch().unwrap().is_empty());

    let with_id = objects.filter(Predicate::not_null("id"));
    assert_eq!(with_id.visibility(), Visibility::VisibleByField);
    assert_eq!(with_id.fetch().unwrap(), vec![c2]);
}

#[test]
fn invisible_types_hide_deleted_documents_from_identity_lookups() {
    let conn = open_db_in_memory().unwrap();
    let registry = SchemaRegistry::builder()
        .register(DocumentSchema::new("note"))
        .build()
        .unwrap();
    let service = sqlite_service(&conn, registry);

    let mut note = create(&service, Document::new("note"));
    service.delete(&mut note, None, &WriteOptions::default()).unwrap();
    let id = note.id.unwrap();

    let objects = service.objects("note").unwrap();
    assert!(objects.filter(Predicate::id(id)).fetch().unwrap().is_empty());
    assert!(matches!(
        objects.get(Predicate::id(id)),
        Err(EngineError::DocumentNotFound { kind }) if kind == "note"
    ));
    let deleted = service.deleted_objects("note").unwrap();
    assert_eq!(deleted.filter(Predicate::id(id)).count().unwrap(), 1);
}

#[test]
fn chained_filters_carry_one_visibility_predicate() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_service(&conn, blog_registry());

    let author = create(&service, Document::new("author"));
    let other_author = create(&service, Document::new("author"));
    let category = create(&service, Document::new("category"));
    let wanted = create(
        &service,
        Document::new("article")
            .with_reference("author", &author)
            .with_reference("category", &category),
    );
    create(
        &service,
        Document::new("article")
            .with_reference("author", &other_author)
            .with_reference("category", &category),
    );

    let query = service
        .objects("article")
        .unwrap()
        .filter(Predicate::references("category", &category))
        .filter(Predicate::references("author", &author));

    let compiled = query.compiled_filter();
    assert_eq!(compiled.len(), 3);
    assert_eq!(
        compiled
            .iter()
            .filter(|predicate| predicate.is_visibility_predicate())
            .count(),
        1
    );
    assert_eq!(query.fetch().unwrap(), vec![wanted]);
}

#[test]
fn applied_visibility_is_not_escalated_by_later_filters() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_service(&conn, blog_registry());

    let mut c1 = create(&service, Document::new("category"));
    service.delete(&mut c1, None, &WriteOptions::default()).unwrap();

    let frozen = service
        .objects("category")
        .unwrap()
        .apply_visibility()
        .filter(Predicate::id(c1.id.unwrap()));

    assert!(frozen.visibility_state().is_applied());
    assert_eq!(frozen.visibility(), Visibility::VisibleByField);
    assert!(!frozen.exists().unwrap());
}

#[test]
fn get_requires_exactly_one_match() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_service(&conn, blog_registry());

    create(&service, Document::new("category").with_field("name", "dup"));
    create(&service, Document::new("category").with_field("name", "dup"));

    let objects = service.objects("category").unwrap();
    assert!(matches!(
        objects.get(Predicate::eq("name", "dup")),
        Err(EngineError::MultipleDocuments { count: 2, .. })
    ));
    assert!(matches!(
        objects.get(Predicate::eq("name", "missing")),
        Err(EngineError::DocumentNotFound { .. })
    ));
}

#[test]
fn all_accepts_a_visibility_override() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_service(&conn, blog_registry());

    let mut gone = create(&service, Document::new("category"));
    create(&service, Document::new("category"));
    service.delete(&mut gone, None, &WriteOptions::default()).unwrap();

    let default = service.all("category", None).unwrap();
    let only_deleted = service.all("category", Some(Visibility::OnlyVisible)).unwrap();
    let everything = service.all("category", Some(Visibility::Visible)).unwrap();

    assert_eq!(default.visibility(), Visibility::VisibleByField);
    assert_eq!(default.count().unwrap(), 1);
    assert_eq!(only_deleted.fetch().unwrap(), vec![gone]);
    assert_eq!(everything.count().unwrap(), 2);
}

#[test]
fn plain_types_are_never_tombstoned_and_hard_deleted() {
    let conn = open_db_in_memory().unwrap();
    let registry = SchemaRegistry::builder()
        .register(DocumentSchema::plain("audit_entry").with_policy(DeletionPolicy::SoftDelete))
        .build()
        .unwrap();
    let service = sqlite_service(&conn, registry);

    let mut entry = create(&service, Document::new("audit_entry"));
    create(&service, Document::new("audit_entry"));
    assert_eq!(accessor_counts(&service, "audit_entry"), (2, 2, 0));

    service.delete(&mut entry, None, &WriteOptions::default()).unwrap();
    assert_eq!(accessor_counts(&service, "audit_entry"), (1, 1, 0));
}

#[test]
fn unknown_types_are_rejected_by_accessors() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_service(&conn, blog_registry());

    assert!(matches!(service.objects("comment"), Err(EngineError::Schema(_))));
}

#[test]
fn escalated_queries_write_with_the_declared_mode() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_service(&conn, blog_registry());

    let mut c1 = create(&service, Document::new("category"));
    service.delete(&mut c1, None, &WriteOptions::default()).unwrap();

    let by_id = service
        .objects("category")
        .unwrap()
        .filter(Predicate::id(c1.id.unwrap()));
    assert_eq!(by_id.count().unwrap(), 1);

    let matched = by_id
        .delete_all(Some(DeletionPolicy::HardDelete), &WriteOptions::default())
        .unwrap();
    assert_eq!(matched, 0);
    assert_eq!(accessor_counts(&service, "category"), (0, 1, 1));
}
