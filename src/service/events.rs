//! Service event stream payloads.

use crate::types::{AnswerId, QuestionId};

/// Events emitted after successful commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// A new question was created.
    QuestionCreated {
        /// Created question id.
        id: QuestionId,
    },
    /// An answer was appended to a question.
    AnswerAdded {
        /// Owning question id.
        question_id: QuestionId,
        /// Appended answer id.
        answer_id: AnswerId,
    },
    /// A vote landed on a question's own ledger.
    QuestionVoted {
        /// Voted question id.
        id: QuestionId,
        /// Net score after the vote.
        score: i64,
    },
    /// A vote landed on an embedded answer's ledger.
    AnswerVoted {
        /// Owning question id.
        question_id: QuestionId,
        /// Voted answer id.
        answer_id: AnswerId,
        /// Net score after the vote.
        score: i64,
    },
}
