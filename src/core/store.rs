use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    core::indices::{OwnerIndex, VecIndex},
    question::Question,
    types::{AnswerId, QuestionId, Revision, UserId},
};

/// Rejected store mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No question with this id.
    #[error("question {0} not found")]
    MissingQuestion(QuestionId),
    /// Insert with an id that is already present.
    #[error("question {0} already exists")]
    AlreadyExists(QuestionId),
    /// An answer id is already owned by a different question.
    #[error("answer {0} already belongs to another question")]
    DuplicateAnswer(AnswerId),
    /// Commit raced a concurrent writer; reload and reapply.
    #[error("stale revision for question {id}: expected {expected}, found {actual}")]
    RevisionMismatch {
        /// Question whose commit was rejected.
        id: QuestionId,
        /// Revision the caller loaded.
        expected: Revision,
        /// Revision actually stored.
        actual: Revision,
    },
}

/// A question document together with its current revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredQuestion {
    /// Revision tag checked by [`QuestionStore::commit`].
    pub revision: Revision,
    /// The full aggregate document.
    pub question: Question,
}

/// Authoritative in-memory store of revision-tagged question documents.
#[derive(Debug, Default)]
pub struct QuestionStore {
    records: HashMap<QuestionId, StoredQuestion>,
    order: Vec<QuestionId>,
    answer_owner: OwnerIndex,
    by_author: VecIndex<UserId>,
}

impl QuestionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from persisted documents, ordering questions by
    /// creation time with the id as tiebreak.
    pub fn from_stored(mut rows: Vec<StoredQuestion>) -> Result<Self, StoreError> {
        rows.sort_by(|a, b| {
            (a.question.created_at, a.question.id).cmp(&(b.question.created_at, b.question.id))
        });

        let mut store = Self::default();
        for row in rows {
            store.insert_at_revision(row.question, row.revision)?;
        }
        Ok(store)
    }

    /// Inserts a new question at revision 1 and returns the stored document.
    pub fn insert(&mut self, question: Question) -> Result<StoredQuestion, StoreError> {
        self.insert_at_revision(question, 1)
    }

    /// Replaces the document for `question.id`, conditioned on `expected`
    /// matching the stored revision, and returns the stored document at
    /// `expected + 1`.
    ///
    /// Ids of newly appended answers are registered; answers are append-only,
    /// so commits never unregister one.
    pub fn commit(
        &mut self,
        expected: Revision,
        question: Question,
    ) -> Result<StoredQuestion, StoreError> {
        let actual = match self.records.get(&question.id) {
            Some(stored) => stored.revision,
            None => return Err(StoreError::MissingQuestion(question.id)),
        };
        if actual != expected {
            return Err(StoreError::RevisionMismatch {
                id: question.id,
                expected,
                actual,
            });
        }
        self.check_answer_ownership(&question)?;

        let revision = expected + 1;
        self.register_answers(&question);
        let stored = StoredQuestion { revision, question };
        self.records.insert(stored.question.id, stored.clone());
        Ok(stored)
    }

    /// Returns the stored document for `id`.
    pub fn get(&self, id: QuestionId) -> Option<&StoredQuestion> {
        self.records.get(&id)
    }

    /// Clone-out variant of [`Self::get`].
    pub fn get_cloned(&self, id: QuestionId) -> Option<StoredQuestion> {
        self.get(id).cloned()
    }

    /// Returns the question owning answer `id`, if any.
    pub fn find_answer_owner(&self, id: AnswerId) -> Option<QuestionId> {
        self.answer_owner.get(&id).copied()
    }

    /// Up to `n` most recently created questions, newest first.
    pub fn recent(&self, n: usize) -> Vec<&StoredQuestion> {
        let start = self.order.len().saturating_sub(n);
        self.order[start..]
            .iter()
            .rev()
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// Clone-out variant of [`Self::recent`].
    pub fn recent_cloned(&self, n: usize) -> Vec<StoredQuestion> {
        self.recent(n).into_iter().cloned().collect()
    }

    /// Questions authored by `author`, oldest first.
    pub fn by_author(&self, author: UserId) -> Vec<&StoredQuestion> {
        self.by_author
            .get(&author)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// Clone-out variant of [`Self::by_author`].
    pub fn by_author_cloned(&self, author: UserId) -> Vec<StoredQuestion> {
        self.by_author(author).into_iter().cloned().collect()
    }

    /// Question ids in creation order.
    pub fn ordered_ids(&self) -> &[QuestionId] {
        &self.order
    }

    /// Number of stored questions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the store holds no questions.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert_at_revision(
        &mut self,
        question: Question,
        revision: Revision,
    ) -> Result<StoredQuestion, StoreError> {
        if self.records.contains_key(&question.id) {
            return Err(StoreError::AlreadyExists(question.id));
        }
        self.check_answer_ownership(&question)?;

        let id = question.id;
        self.register_answers(&question);
        self.by_author.entry(question.author).or_default().push(id);
        self.order.push(id);
        let stored = StoredQuestion { revision, question };
        self.records.insert(id, stored.clone());
        Ok(stored)
    }

    fn check_answer_ownership(&self, question: &Question) -> Result<(), StoreError> {
        for answer in &question.answers {
            if let Some(owner) = self.answer_owner.get(&answer.id) {
                if *owner != question.id {
                    return Err(StoreError::DuplicateAnswer(answer.id));
                }
            }
        }
        Ok(())
    }

    fn register_answers(&mut self, question: &Question) {
        for answer in &question.answers {
            self.answer_owner.insert(answer.id, question.id);
        }
    }
}
