use chrono::{DateTime, Utc};
use uuid::Uuid;

use qboard::{
    core::store::{QuestionStore, StoreError},
    ledger,
    question::{Answer, AnswerDraft, MAX_TITLE_LEN, Question, QuestionDraft, ValidationError},
    types::VoteDirection,
};

fn ts(offset: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + offset, 0).expect("timestamp")
}

fn draft(title: &str, author: Uuid) -> QuestionDraft {
    QuestionDraft {
        title: title.to_string(),
        body: "It compiles, but the output is not what I expected.".to_string(),
        author,
        tags: vec!["rust".to_string()],
    }
}

fn question(title: &str, author: Uuid, offset: i64) -> Question {
    Question::from_draft(draft(title, author), Uuid::new_v4(), ts(offset)).expect("valid draft")
}

fn answer(body: &str, author: Uuid, offset: i64) -> Answer {
    Answer::from_draft(
        AnswerDraft {
            body: body.to_string(),
            author,
        },
        Uuid::new_v4(),
        ts(offset),
    )
    .expect("valid draft")
}

#[test]
fn drafts_are_trimmed_and_validated() {
    let author = Uuid::new_v4();

    let q = Question::from_draft(
        QuestionDraft {
            title: "  Why does this lifetime outlive its scope?  ".to_string(),
            body: "\n  Minimal repro attached.  ".to_string(),
            author,
            tags: vec![
                " rust ".to_string(),
                "rust".to_string(),
                "  ".to_string(),
                "lifetimes".to_string(),
            ],
        },
        Uuid::new_v4(),
        ts(0),
    )
    .expect("valid draft");
    assert_eq!(q.title, "Why does this lifetime outlive its scope?");
    assert_eq!(q.body, "Minimal repro attached.");
    assert_eq!(q.tags, vec!["rust".to_string(), "lifetimes".to_string()]);
    assert!(q.votes.is_empty());
    assert!(q.answers.is_empty());

    let err = Question::from_draft(
        QuestionDraft {
            title: "   ".to_string(),
            ..draft("unused", author)
        },
        Uuid::new_v4(),
        ts(0),
    )
    .unwrap_err();
    assert_eq!(err, ValidationError::EmptyTitle);

    let err = Question::from_draft(
        QuestionDraft {
            title: "q".repeat(MAX_TITLE_LEN + 1),
            ..draft("unused", author)
        },
        Uuid::new_v4(),
        ts(0),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ValidationError::TitleTooLong {
            len: MAX_TITLE_LEN + 1
        }
    );

    let at_limit = Question::from_draft(
        QuestionDraft {
            title: "q".repeat(MAX_TITLE_LEN),
            ..draft("unused", author)
        },
        Uuid::new_v4(),
        ts(0),
    );
    assert!(at_limit.is_ok());

    let err = Question::from_draft(
        QuestionDraft {
            body: " \n ".to_string(),
            ..draft("A fine title", author)
        },
        Uuid::new_v4(),
        ts(0),
    )
    .unwrap_err();
    assert_eq!(err, ValidationError::EmptyBody);

    let err = Answer::from_draft(
        AnswerDraft {
            body: "   ".to_string(),
            author,
        },
        Uuid::new_v4(),
        ts(0),
    )
    .unwrap_err();
    assert_eq!(err, ValidationError::EmptyBody);
}

#[test]
fn insert_starts_at_revision_one_and_rejects_duplicate_ids() {
    let mut store = QuestionStore::new();
    let q = question("First?", Uuid::new_v4(), 0);
    let id = q.id;

    let stored = store.insert(q.clone()).expect("insert");
    assert_eq!(stored.revision, 1);
    assert_eq!(store.get(id).expect("present").question.title, "First?");
    assert_eq!(store.len(), 1);
    assert!(!store.is_empty());

    let err = store.insert(q).unwrap_err();
    assert_eq!(err, StoreError::AlreadyExists(id));
    assert_eq!(store.len(), 1);
}

#[test]
fn commit_bumps_revision_and_stale_commits_lose() {
    let mut store = QuestionStore::new();
    let voter1 = Uuid::new_v4();
    let voter2 = Uuid::new_v4();
    let id = store
        .insert(question("Race?", Uuid::new_v4(), 0))
        .expect("insert")
        .question
        .id;

    let mut first = store.get_cloned(id).expect("document");
    let mut second = store.get_cloned(id).expect("document");

    ledger::apply_vote(&mut first.question.votes, voter1, VoteDirection::Up);
    let committed = store.commit(first.revision, first.question).expect("commit");
    assert_eq!(committed.revision, 2);

    ledger::apply_vote(&mut second.question.votes, voter2, VoteDirection::Down);
    let err = store.commit(second.revision, second.question).unwrap_err();
    assert_eq!(
        err,
        StoreError::RevisionMismatch {
            id,
            expected: 1,
            actual: 2
        }
    );

    let current = store.get(id).expect("document");
    assert_eq!(current.revision, 2);
    assert_eq!(
        ledger::viewer_vote(&current.question.votes, voter1),
        Some(VoteDirection::Up)
    );
    assert_eq!(ledger::viewer_vote(&current.question.votes, voter2), None);
}

#[test]
fn commit_to_missing_question_changes_nothing() {
    let mut store = QuestionStore::new();
    store
        .insert(question("Only one", Uuid::new_v4(), 0))
        .expect("insert");

    let ghost = question("Ghost", Uuid::new_v4(), 1);
    let ghost_id = ghost.id;
    let err = store.commit(1, ghost).unwrap_err();
    assert_eq!(err, StoreError::MissingQuestion(ghost_id));
    assert_eq!(store.len(), 1);
    assert!(store.get(ghost_id).is_none());
}

#[test]
fn appending_answers_preserves_existing_ones() {
    let mut store = QuestionStore::new();
    let author = Uuid::new_v4();
    let id = store
        .insert(question("Append?", author, 0))
        .expect("insert")
        .question
        .id;

    let mut doc = store.get_cloned(id).expect("document");
    doc.question
        .answers
        .push(answer("Use iter().flatten().", Uuid::new_v4(), 1));
    let after_first = store.commit(doc.revision, doc.question).expect("commit");

    let mut doc = store.get_cloned(id).expect("document");
    doc.question
        .answers
        .push(answer("concat() reads better here.", Uuid::new_v4(), 2));
    let after_second = store.commit(doc.revision, doc.question).expect("commit");

    assert_eq!(after_second.revision, 3);
    assert_eq!(after_second.question.answers.len(), 2);
    assert_eq!(
        after_second.question.answers[0],
        after_first.question.answers[0]
    );
}

#[test]
fn answer_ids_resolve_to_their_owner_and_may_not_move() {
    let mut store = QuestionStore::new();
    let author = Uuid::new_v4();

    let mut q1 = question("Owner", author, 0);
    let first_answer = answer("Mine.", Uuid::new_v4(), 1);
    let answer_id = first_answer.id;
    q1.answers.push(first_answer.clone());
    let q1_id = q1.id;
    store.insert(q1).expect("insert");

    let q2_id = store
        .insert(question("Bystander", author, 2))
        .expect("insert")
        .question
        .id;

    assert_eq!(store.find_answer_owner(answer_id), Some(q1_id));
    assert_eq!(store.find_answer_owner(Uuid::new_v4()), None);

    // the same answer id cannot be inserted under another question
    let mut thief = question("Thief", author, 3);
    thief.answers.push(first_answer.clone());
    let err = store.insert(thief).unwrap_err();
    assert_eq!(err, StoreError::DuplicateAnswer(answer_id));

    // nor committed into one
    let mut doc = store.get_cloned(q2_id).expect("document");
    doc.question.answers.push(first_answer);
    let err = store.commit(doc.revision, doc.question).unwrap_err();
    assert_eq!(err, StoreError::DuplicateAnswer(answer_id));
    assert_eq!(store.get(q2_id).expect("document").revision, 1);
}

#[test]
fn recent_and_by_author_track_creation_order() {
    let mut store = QuestionStore::new();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let q1 = question("First", alice, 0);
    let q2 = question("Second", bob, 1);
    let q3 = question("Third", alice, 2);
    let (id1, id2, id3) = (q1.id, q2.id, q3.id);
    store.insert(q1).expect("insert");
    store.insert(q2).expect("insert");
    store.insert(q3).expect("insert");

    let newest: Vec<_> = store.recent(2).into_iter().map(|s| s.question.id).collect();
    assert_eq!(newest, vec![id3, id2]);
    let all: Vec<_> = store.recent(10).into_iter().map(|s| s.question.id).collect();
    assert_eq!(all, vec![id3, id2, id1]);
    assert_eq!(store.ordered_ids(), &[id1, id2, id3]);

    let alices: Vec<_> = store
        .by_author(alice)
        .into_iter()
        .map(|s| s.question.id)
        .collect();
    assert_eq!(alices, vec![id1, id3]);
    assert_eq!(store.by_author_cloned(bob).len(), 1);
    assert!(store.by_author(Uuid::new_v4()).is_empty());
}

#[test]
fn from_stored_rebuilds_order_indices_and_revisions() {
    let mut store = QuestionStore::new();
    let author = Uuid::new_v4();
    let voter = Uuid::new_v4();

    let mut q1 = question("Answered", author, 0);
    let embedded = answer("Carried along.", Uuid::new_v4(), 1);
    let answer_id = embedded.id;
    q1.answers.push(embedded);
    let q1_id = q1.id;
    store.insert(q1).expect("insert");
    store
        .insert(question("Plain", author, 2))
        .expect("insert");

    let mut doc = store.get_cloned(q1_id).expect("document");
    ledger::apply_vote(&mut doc.question.votes, voter, VoteDirection::Up);
    store.commit(doc.revision, doc.question).expect("commit");

    // recent_cloned hands rows back newest first; the rebuild re-sorts them
    let rows = store.recent_cloned(10);
    let rebuilt = QuestionStore::from_stored(rows).expect("rebuild");

    assert_eq!(rebuilt.ordered_ids(), store.ordered_ids());
    assert_eq!(rebuilt.len(), 2);
    assert_eq!(rebuilt.get(q1_id), store.get(q1_id));
    assert_eq!(rebuilt.get(q1_id).expect("document").revision, 2);
    assert_eq!(rebuilt.find_answer_owner(answer_id), Some(q1_id));
}
