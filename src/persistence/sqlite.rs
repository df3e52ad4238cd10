use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode};

use super::{duplicate, validate_document, DocumentStore, StoreError};
use crate::records::RecordKind;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id          INTEGER PRIMARY KEY,
    collection  TEXT NOT NULL,
    doc_key     TEXT,
    body        TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (collection, doc_key)
)
"#;

/// A [`DocumentStore`] backed by one SQLite table; documents are stored as JSON text.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Number of documents stored for `kind`.
    pub fn count(&self, kind: RecordKind) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![kind.collection()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(n).unwrap_or(0))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection lock poisoned".to_string()))
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn create(&self, kind: RecordKind, document: serde_json::Value) -> Result<(), StoreError> {
        let key = validate_document(kind, &document)?;
        let body = serde_json::to_string(&document)?;
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT INTO documents (collection, doc_key, body, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![kind.collection(), key, body, Utc::now().to_rfc3339()],
        );
        match inserted {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(duplicate(kind, &key))
            }
            Err(e) => Err(e.into()),
        }
    }
}
