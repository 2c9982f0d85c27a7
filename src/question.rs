//! Question and answer records, their drafts, and the content rules applied
//! when drafts become records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ledger::Vote,
    types::{AnswerId, QuestionId, UserId},
};

/// Maximum accepted question title length, in characters.
pub const MAX_TITLE_LEN: usize = 300;

/// Rejected draft content. Raised before anything is stored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Title was empty after trimming.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Title exceeded [`MAX_TITLE_LEN`] characters after trimming.
    #[error("title must be at most {MAX_TITLE_LEN} characters, got {len}")]
    TitleTooLong {
        /// Trimmed length that was rejected.
        len: usize,
    },
    /// Body was empty after trimming.
    #[error("body must not be empty")]
    EmptyBody,
}

/// Answer embedded in exactly one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Stable answer identifier, unique across the whole store.
    pub id: AnswerId,
    /// Answer text.
    pub body: String,
    /// Authoring user.
    pub author: UserId,
    /// Vote ledger for this answer.
    pub votes: Vec<Vote>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Aggregate root: a question together with its embedded answers. The whole
/// record is the unit of storage and of atomic commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Stable question identifier.
    pub id: QuestionId,
    /// Question title.
    pub title: String,
    /// Question text.
    pub body: String,
    /// Authoring user.
    pub author: UserId,
    /// Distinct tags in first-seen order.
    pub tags: Vec<String>,
    /// Vote ledger for the question itself.
    pub votes: Vec<Vote>,
    /// Embedded answers in creation order. Append-only.
    pub answers: Vec<Answer>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Payload used to create a new [`Question`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    /// Proposed title; trimmed before validation.
    pub title: String,
    /// Proposed body; trimmed before validation.
    pub body: String,
    /// Authenticated author.
    pub author: UserId,
    /// Free-form tags; trimmed, with empties and duplicates dropped.
    pub tags: Vec<String>,
}

/// Payload used to append an [`Answer`] to an existing question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerDraft {
    /// Proposed body; trimmed before validation.
    pub body: String,
    /// Authenticated author.
    pub author: UserId,
}

impl Question {
    /// Builds a question from a draft, trimming text fields and enforcing the
    /// title and body rules. The ledger and answer list start empty.
    pub fn from_draft(
        draft: QuestionDraft,
        id: QuestionId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let len = title.chars().count();
        if len > MAX_TITLE_LEN {
            return Err(ValidationError::TitleTooLong { len });
        }
        let body = draft.body.trim().to_string();
        if body.is_empty() {
            return Err(ValidationError::EmptyBody);
        }

        let mut tags: Vec<String> = Vec::new();
        for tag in draft.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|seen| seen.as_str() == tag) {
                tags.push(tag.to_string());
            }
        }

        Ok(Self {
            id,
            title,
            body,
            author: draft.author,
            tags,
            votes: Vec::new(),
            answers: Vec::new(),
            created_at,
        })
    }
}

impl Answer {
    /// Builds an answer from a draft, trimming the body and rejecting empty
    /// content. The ledger starts empty.
    pub fn from_draft(
        draft: AnswerDraft,
        id: AnswerId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let body = draft.body.trim().to_string();
        if body.is_empty() {
            return Err(ValidationError::EmptyBody);
        }
        Ok(Self {
            id,
            body,
            author: draft.author,
            votes: Vec::new(),
            created_at,
        })
    }
}
