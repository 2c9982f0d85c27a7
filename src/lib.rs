//! Authoritative in-memory question board with versioned SQLite persistence.
//!
//! Questions are aggregate documents embedding their answers, and every
//! question and answer carries a vote ledger holding at most one entry per
//! user. Commits are revision-checked, so concurrent voters reapply against
//! fresh state instead of overwriting each other, and each committed document
//! is written through to the sink as a whole.
//!
//! # Examples
//!
//! In-memory usage with [`core::store::QuestionStore`]:
//! ```
//! use chrono::Utc;
//! use qboard::{
//!     core::store::QuestionStore,
//!     ledger,
//!     question::{Question, QuestionDraft},
//!     types::VoteDirection,
//! };
//! use uuid::Uuid;
//!
//! let author = Uuid::new_v4();
//! let question = Question::from_draft(
//!     QuestionDraft {
//!         title: "How do I flatten a nested Vec?".to_string(),
//!         body: "Looking for something cleaner than two loops.".to_string(),
//!         author,
//!         tags: vec!["rust".to_string()],
//!     },
//!     Uuid::new_v4(),
//!     Utc::now(),
//! )
//! .expect("valid draft");
//! let id = question.id;
//!
//! let mut store = QuestionStore::new();
//! let stored = store.insert(question).expect("insert");
//! assert_eq!(stored.revision, 1);
//!
//! let mut doc = store.get_cloned(id).expect("present");
//! ledger::apply_vote(&mut doc.question.votes, author, VoteDirection::Up);
//! let committed = store.commit(doc.revision, doc.question).expect("commit");
//! assert_eq!(committed.revision, 2);
//! assert_eq!(ledger::score(&committed.question.votes), 1);
//! ```
//!
//! Service usage with a SQLite sink:
//! ```no_run
//! use qboard::{
//!     persist::sqlite::SqliteQuestionSink,
//!     question::QuestionDraft,
//!     service::handle::{BoardConfig, open_board},
//!     types::VoteDirection,
//! };
//! use uuid::Uuid;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let sink = SqliteQuestionSink::open("qboard.db").expect("open sqlite");
//! let store = sink.load_store().expect("load");
//! let board = open_board(store, Some(Box::new(sink)), BoardConfig::default());
//!
//! let author = Uuid::new_v4();
//! let created = board
//!     .create_question(QuestionDraft {
//!         title: "Why is my future never polled?".to_string(),
//!         body: "Spawned it and nothing happens.".to_string(),
//!         author,
//!         tags: vec!["rust".to_string(), "tokio".to_string()],
//!     })
//!     .await
//!     .expect("create");
//! let receipt = board
//!     .vote_question(created.id, author, VoteDirection::Up)
//!     .await
//!     .expect("vote");
//! assert_eq!(receipt.score, 1);
//! # }
//! ```
#![deny(missing_docs)]

/// Core in-memory store and index helpers.
pub mod core;
/// Vote ledger entries and the pure vote transition.
pub mod ledger;
/// Persistence abstraction and SQLite implementation.
pub mod persist;
/// Question and answer domain records and drafts.
pub mod question;
/// Shared async service handle and events.
pub mod service;
/// Shared primitive types and enums.
pub mod types;
/// Read-side view shapes and projections.
pub mod view;
