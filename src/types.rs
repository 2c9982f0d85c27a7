//! Shared primitive IDs and vote-related enums.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable question identifier.
pub type QuestionId = Uuid;
/// Stable answer identifier, unique across the whole store even though
/// answers live nested inside their owning question.
pub type AnswerId = Uuid;
/// Opaque identifier of a verified user, issued by the identity collaborator.
pub type UserId = Uuid;
/// Per-question revision tag; starts at 1 on insert and advances by exactly
/// 1 on every successful commit.
pub type Revision = u64;

/// Direction of a single vote.
///
/// Serialized with the wire strings `"upvote"` and `"downvote"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteDirection {
    /// Counts +1 toward the score.
    #[serde(rename = "upvote")]
    Up,
    /// Counts -1 toward the score.
    #[serde(rename = "downvote")]
    Down,
}
