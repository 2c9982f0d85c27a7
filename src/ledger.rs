//! Per-votable vote ledgers and the pure transition applied to them.

use serde::{Deserialize, Serialize};

use crate::types::{UserId, VoteDirection};

/// One user's entry in a votable's ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Voting user.
    pub user: UserId,
    /// Direction currently on record.
    pub direction: VoteDirection,
}

/// Applies one vote action to a ledger in place.
///
/// Per-user transition: with no existing entry the vote is appended (cast), a
/// same-direction entry is removed (retract), and an opposite-direction entry
/// is overwritten where it sits (switch). The relative order of every other
/// user's entry is preserved, and afterwards the ledger still holds at most
/// one entry per user. Never fails.
pub fn apply_vote(ledger: &mut Vec<Vote>, user: UserId, direction: VoteDirection) {
    match ledger.iter().position(|vote| vote.user == user) {
        None => ledger.push(Vote { user, direction }),
        Some(idx) if ledger[idx].direction == direction => {
            ledger.remove(idx);
        }
        Some(idx) => ledger[idx].direction = direction,
    }
}

/// Net score of a ledger: upvotes minus downvotes.
pub fn score(ledger: &[Vote]) -> i64 {
    ledger
        .iter()
        .map(|vote| match vote.direction {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        })
        .sum()
}

/// The direction `viewer` currently has on record, if any.
pub fn viewer_vote(ledger: &[Vote], viewer: UserId) -> Option<VoteDirection> {
    ledger
        .iter()
        .find(|vote| vote.user == viewer)
        .map(|vote| vote.direction)
}
