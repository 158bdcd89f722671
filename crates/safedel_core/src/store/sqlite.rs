//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist documents of every declared type in one `documents` table.
//! - Translate predicate conjunctions into parameterized SQL.
//!
//! # Invariants
//! - Identity columns are `(kind, uuid)`; payload fields live in the JSON
//!   `body` and are addressed through `json_extract`.
//! - Only validated names are spliced into SQL; every value is bound.
//! - Results come back in insertion order; upserts keep that order.

use super::{DocumentStore, Predicate, StoreError, StoreResult, WriteOptions};
use crate::db::verify_documents_schema;
use crate::model::document::{Document, DocumentId};
use crate::model::name::{is_valid_name, DELETED_FIELD, ID_FIELD};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};
use serde_json::Value;
use uuid::Uuid;

const DOCUMENT_SELECT_SQL: &str = "SELECT
    kind,
    uuid,
    body,
    deleted_at
FROM documents";

/// Document store over a migrated SQLite connection.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Creates a store from a connection returned by `open_db*`.
    ///
    /// # Errors
    /// `StoreError::Db` carrying `NotMigrated`, `MissingTable` or
    /// `MissingColumn` when the connection skipped `open_db*` bootstrap.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        verify_documents_schema(conn)?;
        Ok(Self { conn })
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn find(&self, kind: &str, filter: &[Predicate]) -> StoreResult<Vec<Document>> {
        let (where_sql, bind_values) = compile_filter(kind, filter)?;
        let mut stmt = self.conn.prepare(&format!(
            "{DOCUMENT_SELECT_SQL} WHERE {where_sql} ORDER BY rowid ASC;"
        ))?;

        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            documents.push(parse_document_row(row)?);
        }
        Ok(documents)
    }

    fn insert_or_update(
        &self,
        document: &Document,
        options: &WriteOptions,
    ) -> StoreResult<DocumentId> {
        document.validate()?;

        let id = document.id.unwrap_or_else(Uuid::new_v4);
        let body = serde_json::to_string(&document.fields)
            .map_err(|err| StoreError::InvalidData(format!("unserializable body: {err}")))?;

        if options.force_insert {
            let inserted = self.conn.execute(
                "INSERT INTO documents (kind, uuid, body, deleted_at)
                 VALUES (?1, ?2, ?3, ?4);",
                params![document.kind.as_str(), id.to_string(), body, document.deleted],
            );
            return match inserted {
                Ok(_) => Ok(id),
                Err(err) if is_constraint_violation(&err) => Err(StoreError::Duplicate {
                    kind: document.kind.clone(),
                    id,
                }),
                Err(err) => Err(err.into()),
            };
        }

        self.conn.execute(
            "INSERT INTO documents (kind, uuid, body, deleted_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (kind, uuid) DO UPDATE SET
                body = excluded.body,
                deleted_at = excluded.deleted_at,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![document.kind.as_str(), id.to_string(), body, document.deleted],
        )?;

        Ok(id)
    }

    fn delete_matching(&self, kind: &str, filter: &[Predicate]) -> StoreResult<usize> {
        let (where_sql, bind_values) = compile_filter(kind, filter)?;
        let removed = self.conn.execute(
            &format!("DELETE FROM documents WHERE {where_sql};"),
            params_from_iter(bind_values),
        )?;
        Ok(removed)
    }

    fn delete_one(&self, kind: &str, id: DocumentId) -> StoreResult<()> {
        let removed = self.conn.execute(
            "DELETE FROM documents WHERE kind = ?1 AND uuid = ?2;",
            params![kind, id.to_string()],
        )?;

        if removed == 0 {
            return Err(StoreError::NotFound {
                kind: kind.to_string(),
                id,
            });
        }
        Ok(())
    }

    fn count(&self, kind: &str, filter: &[Predicate]) -> StoreResult<usize> {
        let (where_sql, bind_values) = compile_filter(kind, filter)?;
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM documents WHERE {where_sql};"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        usize::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative document count `{count}`")))
    }
}

fn compile_filter(kind: &str, filter: &[Predicate]) -> StoreResult<(String, Vec<SqlValue>)> {
    let mut clauses = vec!["kind = ?".to_string()];
    let mut bind_values = vec![SqlValue::Text(kind.to_string())];

    for predicate in filter {
        let column = column_expr(predicate.field())?;
        match predicate {
            Predicate::IsNull(_)
            | Predicate::Eq {
                value: Value::Null,
                ..
            } => clauses.push(format!("{column} IS NULL")),
            Predicate::NotNull(_)
            | Predicate::Ne {
                value: Value::Null,
                ..
            } => clauses.push(format!("{column} IS NOT NULL")),
            Predicate::Eq { value, .. } => {
                clauses.push(format!("{column} = ?"));
                bind_values.push(json_to_sql(value));
            }
            Predicate::Ne { value, .. } => {
                clauses.push(format!("({column} IS NULL OR {column} != ?)"));
                bind_values.push(json_to_sql(value));
            }
        }
    }

    Ok((clauses.join(" AND "), bind_values))
}

fn column_expr(field: &str) -> StoreResult<String> {
    match field {
        ID_FIELD => Ok("uuid".to_string()),
        DELETED_FIELD => Ok("deleted_at".to_string()),
        other if is_valid_name(other) => Ok(format!("json_extract(body, '$.{other}')")),
        other => Err(StoreError::InvalidField(other.to_string())),
    }
}

fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(flag) => SqlValue::Integer(i64::from(*flag)),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => SqlValue::Integer(integer),
            None => SqlValue::Real(number.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(text) => SqlValue::Text(text.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

fn parse_document_row(row: &Row<'_>) -> StoreResult<Document> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{uuid_text}` in documents.uuid"))
    })?;

    let body_text: String = row.get("body")?;
    let fields = match serde_json::from_str::<Value>(&body_text) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) => {
            return Err(StoreError::InvalidData(format!(
                "documents.body for `{uuid_text}` is not a JSON object"
            )));
        }
        Err(err) => {
            return Err(StoreError::InvalidData(format!(
                "invalid JSON in documents.body for `{uuid_text}`: {err}"
            )));
        }
    };

    let document = Document {
        kind: row.get("kind")?,
        id: Some(id),
        fields,
        deleted: row.get("deleted_at")?,
    };
    document.validate()?;
    Ok(document)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}
