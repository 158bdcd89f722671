//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire configuration, logging and the SQLite store together once.
//! - Run one soft-delete/undelete round trip and print per-accessor counts.

use log::{error, info};
use safedel_core::{
    init_logging, open_db, open_db_in_memory, CoreConfig, DeletionPolicy, Document,
    DocumentSchema, Predicate, SafeDeletionService, SaveOptions, SchemaRegistry,
    SqliteDocumentStore, Visibility, WriteOptions,
};
use serde_json::json;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("safedel: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, log_dir)?;
    }

    let conn = match &config.db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let store = SqliteDocumentStore::try_new(&conn)?;
    let service = SafeDeletionService::new(store, demo_registry()?);

    let mut author = Document::new("author").with_field("name", "Ada");
    service.save(&mut author, SaveOptions::default())?;
    let mut category = Document::new("category").with_field("label", "notes");
    service.save(&mut category, SaveOptions::default())?;
    let mut article = Document::new("article")
        .with_field("title", "soft deletes")
        .with_reference("author", &author)
        .with_reference("category", &category);
    service.save(&mut article, SaveOptions::default())?;

    let cascade = Some(DeletionPolicy::SoftDeleteCascade);
    let outcome = service.delete(&mut author, cascade, &WriteOptions::default())?;
    print_counts(&service, &format!("after_delete outcome={}", outcome.as_str()))?;

    service.undelete(&mut author, cascade, &WriteOptions::default())?;
    print_counts(&service, "after_undelete")?;

    let escalated = service
        .objects("category")?
        .filter(Predicate::id(category.id.ok_or("category was not saved")?))
        .visibility();
    info!(
        "event=cli_run module=cli status=ok category_id_lookup_visibility={}",
        escalated
    );
    Ok(())
}

fn demo_registry() -> Result<SchemaRegistry, Box<dyn Error>> {
    Ok(SchemaRegistry::builder()
        .register(DocumentSchema::new("author").with_policy(DeletionPolicy::HardDeleteNoCascade))
        .register(
            DocumentSchema::new("category")
                .with_policy(DeletionPolicy::SoftDelete)
                .with_visibility(Visibility::VisibleByField),
        )
        .register(DocumentSchema::new("article").with_policy(DeletionPolicy::HardDelete))
        .cascade("article", "author", "author")
        .cascade("article", "category", "category")
        .build()?)
}

fn print_counts(
    service: &SafeDeletionService<SqliteDocumentStore<'_>>,
    stage: &str,
) -> Result<(), Box<dyn Error>> {
    for kind in service.registry().type_names() {
        let manager = service.manager(kind)?;
        let summary = json!({
            "stage": stage,
            "kind": kind,
            "objects": manager.objects().count()?,
            "all_objects": manager.all_objects().count()?,
            "deleted_objects": manager.deleted_objects().count()?,
        });
        println!("{summary}");
    }
    Ok(())
}
