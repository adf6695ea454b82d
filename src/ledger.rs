//! Append-only submission ledger.
//!
//! Entries live in an `Arc<Vec<_>>` behind a single lock. Appends and purges swap in a new
//! vector (copy-on-write when a reader still holds the old one), so a `LedgerSnapshot` is
//! always a complete, consistent view: never a torn entry and never a half-purged set.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::{NewSubmission, Submission};

#[derive(Default)]
struct LedgerInner {
    entries: Arc<Vec<Submission>>,
    next_seq: u64,
    /// Bumped on every append and purge.
    version: u64,
}

#[derive(Default)]
pub struct SubmissionLedger {
    inner: RwLock<LedgerInner>,
}

/// Result of an append: the stored entry and the pair's history as it was just before it.
#[derive(Debug, Clone)]
pub struct Appended {
    pub entry: Submission,
    pub prior: Vec<Submission>,
}

impl SubmissionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Duplicate content is accepted; every entry gets its own id.
    #[instrument(level = "debug", skip(self, new), fields(user = %new.user_id, challenge = %new.challenge_id, correct = new.correct))]
    pub async fn record(&self, new: NewSubmission) -> Appended {
        let mut inner = self.inner.write().await;
        let prior = inner
            .entries
            .iter()
            .filter(|s| s.user_id == new.user_id && s.challenge_id == new.challenge_id)
            .cloned()
            .collect::<Vec<_>>();

        let entry = Submission {
            id: Uuid::new_v4(),
            seq: inner.next_seq,
            user_id: new.user_id,
            challenge_id: new.challenge_id,
            submitted: new.submitted,
            at: new.at,
            correct: new.correct,
            part_key: new.part_key,
        };
        inner.next_seq += 1;
        inner.version += 1;
        Arc::make_mut(&mut inner.entries).push(entry.clone());
        debug!(target: "submission", id = %entry.id, seq = entry.seq, "Ledger entry appended");

        Appended { entry, prior: order(prior) }
    }

    /// Entries for one (user, challenge) pair, ordered by submission time.
    pub async fn query(&self, user_id: &str, challenge_id: &str) -> Vec<Submission> {
        self.snapshot().await.query(user_id, challenge_id).into_iter().cloned().collect()
    }

    /// Entries for one challenge across all users, ordered by submission time.
    pub async fn query_all(&self, challenge_id: &str) -> Vec<Submission> {
        self.snapshot().await.query_all(challenge_id).into_iter().cloned().collect()
    }

    /// Remove every entry matching `predicate` in one step. Returns the removed entries.
    #[instrument(level = "debug", skip_all)]
    pub async fn purge<F>(&self, predicate: F) -> Vec<Submission>
    where
        F: Fn(&Submission) -> bool,
    {
        let mut inner = self.inner.write().await;
        let (removed, kept): (Vec<Submission>, Vec<Submission>) =
            inner.entries.iter().cloned().partition(|s| predicate(s));
        if !removed.is_empty() {
            inner.entries = Arc::new(kept);
            inner.version += 1;
        }
        debug!(target: "admin", removed = removed.len(), "Ledger purge applied");
        removed
    }

    pub async fn snapshot(&self) -> LedgerSnapshot {
        let inner = self.inner.read().await;
        LedgerSnapshot { entries: inner.entries.clone(), version: inner.version }
    }

    #[cfg(test)]
    pub async fn version(&self) -> u64 {
        self.inner.read().await.version
    }
}

/// Immutable view of the ledger at one point in time. All derivations run against one of these.
#[derive(Clone, Debug, Default)]
pub struct LedgerSnapshot {
    entries: Arc<Vec<Submission>>,
    version: u64,
}

impl LedgerSnapshot {
    #[cfg(test)]
    pub fn from_entries(entries: Vec<Submission>) -> Self {
        Self { entries: Arc::new(entries), version: 0 }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn correct_count(&self) -> usize {
        self.entries.iter().filter(|s| s.correct).count()
    }

    pub fn query(&self, user_id: &str, challenge_id: &str) -> Vec<&Submission> {
        order(
            self.entries
                .iter()
                .filter(|s| s.user_id == user_id && s.challenge_id == challenge_id)
                .collect(),
        )
    }

    pub fn query_all(&self, challenge_id: &str) -> Vec<&Submission> {
        order(self.entries.iter().filter(|s| s.challenge_id == challenge_id).collect())
    }

    /// One user's entries grouped by challenge id, each group in time order.
    pub fn by_challenge_for_user(&self, user_id: &str) -> HashMap<&str, Vec<&Submission>> {
        let mut groups: HashMap<&str, Vec<&Submission>> = HashMap::new();
        for s in self.entries.iter().filter(|s| s.user_id == user_id) {
            groups.entry(s.challenge_id.as_str()).or_default().push(s);
        }
        for group in groups.values_mut() {
            group.sort_by_key(|s| (s.at, s.seq));
        }
        groups
    }
}

fn order<T: std::borrow::Borrow<Submission>>(mut entries: Vec<T>) -> Vec<T> {
    entries.sort_by_key(|s| {
        let s = s.borrow();
        (s.at, s.seq)
    });
    entries
}
