//! SQLite-backed question document store, one row per question.

use std::path::Path;

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::core::store::{QuestionStore, StoredQuestion};

use super::{PersistError, PersistResult, QuestionSink};

const DOC_FORMAT_VERSION: u16 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentEnvelope {
    format_version: u16,
    stored: StoredQuestion,
}

/// SQLite implementation of [`crate::persist::QuestionSink`].
pub struct SqliteQuestionSink {
    conn: Connection,
}

impl SqliteQuestionSink {
    /// Opens or creates a SQLite-backed sink at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory SQLite sink.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn })
    }

    /// Rebuilds the in-memory store from every persisted document.
    pub fn load_store(&self) -> PersistResult<QuestionStore> {
        let rows = self.load_all()?;
        QuestionStore::from_stored(rows)
            .map_err(|err| PersistError::Message(format!("store rebuild failed: {err}")))
    }

    /// Loads every persisted document, oldest first.
    pub fn load_all(&self) -> PersistResult<Vec<StoredQuestion>> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM questions ORDER BY created_ts_ms ASC, id ASC")?;

        let rows = stmt.query_map([], |row| {
            let payload: Vec<u8> = row.get(0)?;
            decode_document_payload(&payload).map_err(|err| {
                rusqlite::Error::FromSqlConversionFailure(
                    payload.len(),
                    rusqlite::types::Type::Blob,
                    Box::new(std::io::Error::other(err)),
                )
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Number of persisted questions.
    pub fn count(&self) -> PersistResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl QuestionSink for SqliteQuestionSink {
    fn upsert(&mut self, stored: &StoredQuestion) -> PersistResult<()> {
        let payload = serde_json::to_vec(&DocumentEnvelope {
            format_version: DOC_FORMAT_VERSION,
            stored: stored.clone(),
        })?;
        // Revisions only move forward: a late write from the loser of an
        // in-memory race must not regress the row.
        self.conn.execute(
            "INSERT INTO questions(id, revision, created_ts_ms, payload) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(id) DO UPDATE SET \
               revision = excluded.revision, payload = excluded.payload \
             WHERE excluded.revision > questions.revision",
            params![
                stored.question.id.to_string(),
                stored.revision as i64,
                stored.question.created_at.timestamp_millis(),
                payload,
            ],
        )?;
        Ok(())
    }

    fn flush(&mut self) -> PersistResult<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(PASSIVE);")?;
        Ok(())
    }
}

fn decode_document_payload(payload: &[u8]) -> Result<StoredQuestion, String> {
    let envelope: DocumentEnvelope = serde_json::from_slice(payload)
        .map_err(|e| format!("document payload decode failed: {e}"))?;
    if envelope.format_version != DOC_FORMAT_VERSION {
        return Err(format!(
            "unsupported document format version: {}",
            envelope.format_version
        ));
    }
    Ok(envelope.stored)
}
