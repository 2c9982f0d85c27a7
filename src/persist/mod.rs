//! Persistence boundary for committed question documents.

/// SQLite implementation of the sink.
pub mod sqlite;

use thiserror::Error;

use crate::core::store::StoredQuestion;

/// Persistence failure.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Underlying SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Document payload (de)serialization failure.
    #[error("payload serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Any other failure.
    #[error("{0}")]
    Message(String),
}

/// Result alias for persistence calls.
pub type PersistResult<T> = Result<T, PersistError>;

/// Write side of the persistence boundary.
///
/// A sink receives each committed document as one upsert; the entire question
/// with its ledger and embedded answers is the unit of durability.
pub trait QuestionSink: Send {
    /// Stores `stored` as the latest durable state of its question.
    fn upsert(&mut self, stored: &StoredQuestion) -> PersistResult<()>;

    /// Forces buffered state to durable storage.
    fn flush(&mut self) -> PersistResult<()> {
        Ok(())
    }
}
