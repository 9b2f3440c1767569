//! SQLite persistence: knowledge-base documents and QA history.
//!
//! The store is an external collaborator from the retrieval core's point of
//! view: it owns document rowids (which become `DocId`s) and the history of
//! answered questions. History writes are best-effort; the orchestrator
//! never fails a request over them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use ragserve_core::{DocId, Document};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Errors from the SQLite store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// External capability recording answered questions.
///
/// Failures are non-fatal: the orchestrator logs and swallows them because a
/// valid answer already exists by the time history is written.
#[async_trait]
pub trait History: Send + Sync {
    async fn record(
        &self,
        question: &str,
        answer: &str,
        source_ids: &[DocId],
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

/// A recorded QA interaction, as returned by the history listing.
#[derive(Debug, Clone, Serialize)]
pub struct QaRecord {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub source_ids: Vec<DocId>,
    pub created_at: String,
}

/// SQLite-backed document store and QA history.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and ensures the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS qa_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                source_ids TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Replaces the entire document set with `texts`, returning new ids.
    ///
    /// Wholesale replacement matches the snapshot model: there are no
    /// incremental updates within one build.
    pub fn replace_documents(&self, texts: &[String]) -> Result<Vec<DocId>, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM documents", [])?;
        let mut ids = Vec::with_capacity(texts.len());
        {
            let mut stmt = tx.prepare("INSERT INTO documents (text) VALUES (?1)")?;
            for text in texts {
                stmt.execute([text])?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
        Ok(ids)
    }

    /// Loads all documents in ascending id order.
    pub fn load_documents(&self) -> Result<Vec<Document>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id, text FROM documents ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Document::new(row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut docs = Vec::new();
        for row in rows {
            docs.push(row?);
        }
        Ok(docs)
    }

    /// Number of stored documents.
    pub fn document_count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    /// Most recent QA interactions, newest first.
    pub fn recent_history(&self, limit: usize, offset: usize) -> Result<Vec<QaRecord>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, question, answer, source_ids, created_at
             FROM qa_history ORDER BY id DESC LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt.query_map([limit as i64, offset as i64], |row| {
            let raw_ids: String = row.get(3)?;
            Ok(QaRecord {
                id: row.get(0)?,
                question: row.get(1)?,
                answer: row.get(2)?,
                source_ids: serde_json::from_str(&raw_ids).unwrap_or_default(),
                created_at: row.get(4)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

#[async_trait]
impl History for SqliteStore {
    async fn record(
        &self,
        question: &str,
        answer: &str,
        source_ids: &[DocId],
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let ids_json = serde_json::to_string(source_ids).unwrap_or_else(|_| "[]".into());
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO qa_history (question, answer, source_ids, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![question, answer, ids_json, created_at.to_rfc3339()],
        )?;
        Ok(())
    }
}
