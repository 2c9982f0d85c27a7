//! Read-side projections of stored questions.
//!
//! Views are the only shapes handed to callers: scores and the viewer's own
//! vote are recomputed from the ledgers on every projection, and the raw
//! ledgers themselves never cross the crate boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ledger::{self, Vote},
    question::{Answer, Question},
    types::{AnswerId, QuestionId, UserId, VoteDirection},
};

/// Outcome of a vote operation: the votable's new score and the direction the
/// voter now has on record (`None` after a retract).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    /// Net score after the vote.
    pub score: i64,
    /// Direction now on record for the voter.
    pub viewer_vote: Option<VoteDirection>,
}

impl VoteReceipt {
    /// Projects a receipt for `user` from a ledger.
    pub fn from_ledger(ledger: &[Vote], user: UserId) -> Self {
        Self {
            score: ledger::score(ledger),
            viewer_vote: ledger::viewer_vote(ledger, user),
        }
    }
}

/// Externally exposed answer shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerView {
    /// Answer id.
    pub id: AnswerId,
    /// Answer text.
    pub body: String,
    /// Authoring user.
    pub author: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Net score recomputed from the ledger.
    pub score: i64,
    /// The viewing user's own vote, `None` for anonymous viewers.
    pub viewer_vote: Option<VoteDirection>,
}

/// Externally exposed question shape with nested answer views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    /// Question id.
    pub id: QuestionId,
    /// Question title.
    pub title: String,
    /// Question text.
    pub body: String,
    /// Authoring user.
    pub author: UserId,
    /// Distinct tags in first-seen order.
    pub tags: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Net score recomputed from the ledger.
    pub score: i64,
    /// The viewing user's own vote, `None` for anonymous viewers.
    pub viewer_vote: Option<VoteDirection>,
    /// Answer views in creation order.
    pub answers: Vec<AnswerView>,
}

/// Projects an answer for `viewer` (anonymous when `None`).
pub fn answer_view(answer: &Answer, viewer: Option<UserId>) -> AnswerView {
    AnswerView {
        id: answer.id,
        body: answer.body.clone(),
        author: answer.author,
        created_at: answer.created_at,
        score: ledger::score(&answer.votes),
        viewer_vote: viewer.and_then(|user| ledger::viewer_vote(&answer.votes, user)),
    }
}

/// Projects a question and all of its answers for `viewer`.
pub fn question_view(question: &Question, viewer: Option<UserId>) -> QuestionView {
    QuestionView {
        id: question.id,
        title: question.title.clone(),
        body: question.body.clone(),
        author: question.author,
        tags: question.tags.clone(),
        created_at: question.created_at,
        score: ledger::score(&question.votes),
        viewer_vote: viewer.and_then(|user| ledger::viewer_vote(&question.votes, user)),
        answers: question
            .answers
            .iter()
            .map(|answer| answer_view(answer, viewer))
            .collect(),
    }
}
