use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    core::store::{QuestionStore, StoreError, StoredQuestion},
    ledger,
    persist::{PersistError, QuestionSink},
    question::{Answer, AnswerDraft, Question, QuestionDraft, ValidationError},
    types::{AnswerId, QuestionId, UserId, VoteDirection},
    view::{self, QuestionView, VoteReceipt},
};

use super::events::BoardEvent;

/// Operation failure surfaced to callers.
#[derive(Debug, Error)]
pub enum BoardError {
    /// No question with this id. Nothing was mutated.
    #[error("question {0} not found")]
    QuestionNotFound(QuestionId),
    /// No answer with this id in any question. Nothing was mutated.
    #[error("answer {0} not found")]
    AnswerNotFound(AnswerId),
    /// Draft content was rejected before anything was stored.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Commit contention outlasted the retry bound; safe to retry later.
    #[error("commit conflicted {attempts} times, try again")]
    RetryExhausted {
        /// Attempts made before giving up.
        attempts: u32,
    },
    /// Persistence failure; the in-memory state already holds the change.
    #[error(transparent)]
    Persist(#[from] PersistError),
    /// Store rejection that is not expressible through this API's arguments.
    #[error("store rejected operation: {0}")]
    Store(StoreError),
}

impl BoardError {
    /// True for transient contention failures where retrying the same call
    /// later is expected to succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RetryExhausted { .. })
    }
}

/// Tunables for the service layer.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Bound on read-modify-write attempts per operation. With each failed
    /// attempt implying some other writer's commit, the default of 8 covers
    /// eight simultaneous single-operation writers per document.
    pub max_commit_retries: u32,
    /// Checkpoint the sink's WAL after question and answer creation.
    pub flush_on_create: bool,
    /// Capacity of the broadcast event channel.
    pub events_capacity: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            max_commit_retries: 8,
            flush_on_create: true,
            events_capacity: 1024,
        }
    }
}

/// Cloneable async front over the authoritative store.
///
/// Reads clone documents out under a short read lock. Mutations load a clone,
/// apply the change, then commit under a short write lock with a revision
/// check, retrying from fresh state on conflict. No lock is held across an
/// await or across a whole read-modify-write cycle.
pub struct BoardHandle {
    inner: Arc<BoardInner>,
}

impl Clone for BoardHandle {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct BoardInner {
    store: RwLock<QuestionStore>,
    sink: Option<Arc<Mutex<Box<dyn QuestionSink>>>>,
    config: BoardConfig,
    events_tx: broadcast::Sender<BoardEvent>,
}

/// Opens a board over `store`, optionally writing every committed document
/// through to `sink`.
pub fn open_board(
    store: QuestionStore,
    sink: Option<Box<dyn QuestionSink>>,
    config: BoardConfig,
) -> BoardHandle {
    let (events_tx, _) = broadcast::channel::<BoardEvent>(config.events_capacity.max(1));

    BoardHandle {
        inner: Arc::new(BoardInner {
            store: RwLock::new(store),
            sink: sink.map(|sink| Arc::new(Mutex::new(sink))),
            config,
            events_tx,
        }),
    }
}

impl BoardHandle {
    /// Subscribes to events emitted after successful commits.
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.inner.events_tx.subscribe()
    }

    /// Creates a question from `draft` and returns its view for the author.
    pub async fn create_question(&self, draft: QuestionDraft) -> Result<QuestionView, BoardError> {
        let author = draft.author;
        let question = Question::from_draft(draft, Uuid::new_v4(), Utc::now())?;
        let id = question.id;

        let stored = {
            let mut store = self.inner.store.write().await;
            store.insert(question).map_err(BoardError::Store)?
        };

        self.persist(&stored, self.inner.config.flush_on_create)
            .await?;
        debug!(%id, "question created");
        let _ = self.inner.events_tx.send(BoardEvent::QuestionCreated { id });
        Ok(view::question_view(&stored.question, Some(author)))
    }

    /// Appends an answer to `question_id` and returns the updated question
    /// view for the answer's author.
    ///
    /// Existing answers keep their ids and positions; the new answer lands at
    /// the end.
    pub async fn add_answer(
        &self,
        question_id: QuestionId,
        draft: AnswerDraft,
    ) -> Result<QuestionView, BoardError> {
        let author = draft.author;
        let answer = Answer::from_draft(draft, Uuid::new_v4(), Utc::now())?;
        let answer_id = answer.id;

        let stored = self
            .commit_with_retry(question_id, move |question| {
                question.answers.push(answer.clone());
            })
            .await?;

        self.persist(&stored, self.inner.config.flush_on_create)
            .await?;
        debug!(%question_id, %answer_id, "answer added");
        let _ = self.inner.events_tx.send(BoardEvent::AnswerAdded {
            question_id,
            answer_id,
        });
        Ok(view::question_view(&stored.question, Some(author)))
    }

    /// Casts, switches, or retracts `user`'s vote on a question.
    pub async fn vote_question(
        &self,
        question_id: QuestionId,
        user: UserId,
        direction: VoteDirection,
    ) -> Result<VoteReceipt, BoardError> {
        let stored = self
            .commit_with_retry(question_id, move |question| {
                ledger::apply_vote(&mut question.votes, user, direction);
            })
            .await?;

        self.persist(&stored, false).await?;
        let receipt = VoteReceipt::from_ledger(&stored.question.votes, user);
        debug!(%question_id, %user, ?direction, score = receipt.score, "question vote applied");
        let _ = self.inner.events_tx.send(BoardEvent::QuestionVoted {
            id: question_id,
            score: receipt.score,
        });
        Ok(receipt)
    }

    /// Casts, switches, or retracts `user`'s vote on an answer.
    ///
    /// The owning question is the commit unit: only that answer's ledger
    /// changes, in one atomic document replacement.
    pub async fn vote_answer(
        &self,
        answer_id: AnswerId,
        user: UserId,
        direction: VoteDirection,
    ) -> Result<VoteReceipt, BoardError> {
        let max_attempts = self.inner.config.max_commit_retries.max(1);
        for attempt in 1..=max_attempts {
            let loaded = {
                let store = self.inner.store.read().await;
                match store.find_answer_owner(answer_id) {
                    Some(question_id) => store.get_cloned(question_id),
                    None => return Err(BoardError::AnswerNotFound(answer_id)),
                }
            };
            let Some(StoredQuestion {
                revision,
                mut question,
            }) = loaded
            else {
                return Err(BoardError::AnswerNotFound(answer_id));
            };

            let receipt = {
                let Some(answer) = question.answers.iter_mut().find(|a| a.id == answer_id) else {
                    return Err(BoardError::AnswerNotFound(answer_id));
                };
                ledger::apply_vote(&mut answer.votes, user, direction);
                VoteReceipt::from_ledger(&answer.votes, user)
            };

            let question_id = question.id;
            let committed = {
                let mut store = self.inner.store.write().await;
                store.commit(revision, question)
            };
            match committed {
                Ok(stored) => {
                    self.persist(&stored, false).await?;
                    debug!(%answer_id, %user, ?direction, score = receipt.score, "answer vote applied");
                    let _ = self.inner.events_tx.send(BoardEvent::AnswerVoted {
                        question_id,
                        answer_id,
                        score: receipt.score,
                    });
                    return Ok(receipt);
                }
                Err(StoreError::RevisionMismatch {
                    expected, actual, ..
                }) => {
                    debug!(%answer_id, attempt, expected, actual, "commit conflict, reloading");
                }
                Err(StoreError::MissingQuestion(_)) => {
                    return Err(BoardError::AnswerNotFound(answer_id));
                }
                Err(other) => return Err(BoardError::Store(other)),
            }
        }

        warn!(%answer_id, attempts = max_attempts, "commit retries exhausted");
        Err(BoardError::RetryExhausted {
            attempts: max_attempts,
        })
    }

    /// Returns `question_id` projected for `viewer` (anonymous when `None`).
    pub async fn question(
        &self,
        question_id: QuestionId,
        viewer: Option<UserId>,
    ) -> Result<QuestionView, BoardError> {
        let store = self.inner.store.read().await;
        let stored = store
            .get(question_id)
            .ok_or(BoardError::QuestionNotFound(question_id))?;
        Ok(view::question_view(&stored.question, viewer))
    }

    /// Up to `n` newest questions projected for `viewer`, newest first.
    pub async fn recent(&self, n: usize, viewer: Option<UserId>) -> Vec<QuestionView> {
        let store = self.inner.store.read().await;
        store
            .recent(n)
            .into_iter()
            .map(|stored| view::question_view(&stored.question, viewer))
            .collect()
    }

    /// Questions authored by `author`, oldest first, projected for `viewer`.
    pub async fn by_author(&self, author: UserId, viewer: Option<UserId>) -> Vec<QuestionView> {
        let store = self.inner.store.read().await;
        store
            .by_author(author)
            .into_iter()
            .map(|stored| view::question_view(&stored.question, viewer))
            .collect()
    }

    /// Forces the sink's buffered state to durable storage, if one is
    /// attached.
    pub async fn flush(&self) -> Result<(), BoardError> {
        let Some(sink) = &self.inner.sink else {
            return Ok(());
        };
        let sink = Arc::clone(sink);
        tokio::task::spawn_blocking(move || {
            let mut sink = sink.blocking_lock();
            sink.flush()
        })
        .await
        .map_err(|e| PersistError::Message(format!("join error: {e}")))??;
        Ok(())
    }

    async fn commit_with_retry<F>(
        &self,
        question_id: QuestionId,
        mut mutate: F,
    ) -> Result<StoredQuestion, BoardError>
    where
        F: FnMut(&mut Question),
    {
        let max_attempts = self.inner.config.max_commit_retries.max(1);
        for attempt in 1..=max_attempts {
            let loaded = {
                let store = self.inner.store.read().await;
                store.get_cloned(question_id)
            };
            let Some(StoredQuestion {
                revision,
                mut question,
            }) = loaded
            else {
                return Err(BoardError::QuestionNotFound(question_id));
            };

            mutate(&mut question);

            let committed = {
                let mut store = self.inner.store.write().await;
                store.commit(revision, question)
            };
            match committed {
                Ok(stored) => return Ok(stored),
                Err(StoreError::RevisionMismatch {
                    expected, actual, ..
                }) => {
                    debug!(%question_id, attempt, expected, actual, "commit conflict, reloading");
                }
                Err(StoreError::MissingQuestion(id)) => {
                    return Err(BoardError::QuestionNotFound(id));
                }
                Err(other) => return Err(BoardError::Store(other)),
            }
        }

        warn!(%question_id, attempts = max_attempts, "commit retries exhausted");
        Err(BoardError::RetryExhausted {
            attempts: max_attempts,
        })
    }

    async fn persist(&self, stored: &StoredQuestion, flush: bool) -> Result<(), BoardError> {
        let Some(sink) = &self.inner.sink else {
            return Ok(());
        };

        let sink = Arc::clone(sink);
        let stored = stored.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut sink = sink.blocking_lock();
            sink.upsert(&stored)?;
            if flush {
                sink.flush()?;
            }
            Result::<(), PersistError>::Ok(())
        })
        .await
        .map_err(|e| PersistError::Message(format!("join error: {e}")))
        .and_then(|inner| inner);

        if let Err(err) = result {
            warn!(error = %err, "write-through persistence failed");
            return Err(err.into());
        }
        Ok(())
    }
}
