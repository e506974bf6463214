use super::models::{DocumentRef, FieldUpdate, FieldValue};
use super::store::{DocumentStore, StoreError};
use crate::sqlite_column;
use crate::sqlite_persistence::{
    migrate_if_needed, Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};
use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension};
use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tracing::{debug, info};

/// V 0
const DOCUMENT_TABLE_V_0: Table = Table {
    name: "document",
    columns: &[
        sqlite_column!("collection", SqlType::Text, non_null = true),
        sqlite_column!("id", SqlType::Text, non_null = true),
        sqlite_column!("body", SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[&["collection", "id"]],
    indices: &[("idx_document_collection", "collection")],
};

/// V 1
const DOCUMENT_TABLE_V_1: Table = Table {
    name: "document",
    columns: &[
        sqlite_column!("collection", SqlType::Text, non_null = true),
        sqlite_column!("id", SqlType::Text, non_null = true),
        sqlite_column!("body", SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("updated", SqlType::Integer),
    ],
    unique_constraints: &[&["collection", "id"]],
    indices: &[("idx_document_collection", "collection")],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[DOCUMENT_TABLE_V_0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[DOCUMENT_TABLE_V_1],
        migration: Some(|conn: &Connection| {
            conn.execute("ALTER TABLE document ADD COLUMN updated INTEGER", [])?;
            conn.execute("UPDATE document SET updated = created", [])?;
            Ok(())
        }),
    },
];

const TABLE: &str = DOCUMENT_TABLE_V_1.name;

/// Quoted JSON path for a top-level field. SQLite path labels have no escape
/// for `"`, so such names are refused.
fn json_path(field: &str) -> Result<String, StoreError> {
    if field.is_empty() || field.contains('"') {
        return Err(StoreError::InvalidField(field.to_string()));
    }
    Ok(format!("$.\"{}\"", field))
}

#[derive(Clone)]
pub struct SqliteDocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDocumentStore {
    pub fn new<T: AsRef<Path>>(db_path: T, busy_timeout: Duration) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = if db_path.exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_context(|| format!("Failed to open document db at {:?}", db_path))?
        } else {
            info!("Creating new document db at {:?}", db_path);
            let conn = Connection::open(db_path)?;
            latest_schema().create(&conn)?;
            conn
        };
        conn.busy_timeout(busy_timeout)?;
        migrate_if_needed(&conn, VERSIONED_SCHEMAS)?;

        Ok(SqliteDocumentStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens a private in-memory database, mostly useful in tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        latest_schema().create(&conn)?;
        Ok(SqliteDocumentStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }
}

fn latest_schema() -> &'static VersionedSchema {
    &VERSIONED_SCHEMAS[VERSIONED_SCHEMAS.len() - 1]
}

impl DocumentStore for SqliteDocumentStore {
    fn update_fields(
        &self,
        target: &DocumentRef,
        updates: &[FieldUpdate],
    ) -> Result<(), StoreError> {
        let now_ms = chrono::Utc::now().timestamp_millis();

        let mut set_args = String::new();
        let mut values: Vec<Value> = Vec::with_capacity(updates.len() * 2 + 2);
        for update in updates {
            values.push(Value::Text(json_path(&update.field)?));
            let path_index = values.len();
            match update.value {
                FieldValue::Bool(b) => {
                    values.push(Value::Text(b.to_string()));
                    set_args.push_str(&format!(", ?{}, json(?{})", path_index, path_index + 1));
                }
                FieldValue::ServerTimestamp => {
                    values.push(Value::Integer(now_ms));
                    set_args.push_str(&format!(", ?{}, ?{}", path_index, path_index + 1));
                }
            }
        }
        values.push(Value::Text(target.collection.clone()));
        values.push(Value::Text(target.id.clone()));

        let sql = format!(
            "UPDATE {TABLE} SET body = json_set(body{set_args}), updated = {DEFAULT_TIMESTAMP} \
             WHERE collection = ?{} AND id = ?{}",
            values.len() - 1,
            values.len()
        );

        let conn = self.lock()?;
        let changed = conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Err(StoreError::NotFound(target.clone()));
        }
        debug!("Updated {} field(s) on {}", updates.len(), target);
        Ok(())
    }

    fn increment_field(
        &self,
        target: &DocumentRef,
        field: &str,
        by: i64,
    ) -> Result<i64, StoreError> {
        if by < 0 {
            return Err(StoreError::InvalidIncrement(by));
        }
        let path = json_path(field)?;

        let conn = self.lock()?;
        let new_value: Option<i64> = conn
            .query_row(
                &format!(
                    "UPDATE {TABLE} \
                     SET body = json_set(body, ?1, COALESCE(json_extract(body, ?1), 0) + ?2), \
                         updated = {DEFAULT_TIMESTAMP} \
                     WHERE collection = ?3 AND id = ?4 \
                       AND (json_type(body, ?1) IS NULL OR json_type(body, ?1) = 'integer') \
                       AND COALESCE(json_extract(body, ?1), 0) <= {} - ?2 \
                     RETURNING json_extract(body, ?1)",
                    i64::MAX
                ),
                params![path, by, target.collection, target.id],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(value) = new_value {
            return Ok(value);
        }

        // Nothing matched: the document is missing, the field is not an integer,
        // or the integer is too close to i64::MAX to take the increment.
        let found: Option<Option<String>> = conn
            .query_row(
                &format!("SELECT json_type(body, ?1) FROM {TABLE} WHERE collection = ?2 AND id = ?3"),
                params![path, target.collection, target.id],
                |row| row.get(0),
            )
            .optional()?;
        match found {
            None => Err(StoreError::NotFound(target.clone())),
            Some(Some(found)) if found == "integer" => Err(StoreError::CounterOverflow {
                target: target.clone(),
                field: field.to_string(),
                by,
            }),
            Some(found) => Err(StoreError::FieldTypeMismatch {
                target: target.clone(),
                field: field.to_string(),
                found: found.unwrap_or_else(|| "missing".to_string()),
            }),
        }
    }

    fn insert_document(
        &self,
        target: &DocumentRef,
        body: serde_json::Value,
    ) -> Result<(), StoreError> {
        if !body.is_object() {
            return Err(StoreError::InvalidDocument(format!(
                "{} body must be a JSON object",
                target
            )));
        }
        let body = serde_json::to_string(&body)?;
        let conn = self.lock()?;
        conn.execute(
            &format!("INSERT INTO {TABLE} (collection, id, body, updated) VALUES (?1, ?2, ?3, {DEFAULT_TIMESTAMP})"),
            params![target.collection, target.id, body],
        )?;
        Ok(())
    }

    fn get_document(&self, target: &DocumentRef) -> Result<Option<serde_json::Value>, StoreError> {
        let conn = self.lock()?;
        let body: Option<String> = conn
            .query_row(
                &format!("SELECT body FROM {TABLE} WHERE collection = ?1 AND id = ?2"),
                params![target.collection, target.id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(body.map(|b| serde_json::from_str(&b)).transpose()?)
    }
}
