use hashbrown::HashMap;

use crate::types::{AnswerId, QuestionId};

/// Maps each answer id to its owning question.
pub type OwnerIndex = HashMap<AnswerId, QuestionId>;

/// Multi-valued index from a key to question ids in insertion order.
pub type VecIndex<K> = HashMap<K, Vec<QuestionId>>;
