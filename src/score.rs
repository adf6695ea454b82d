//! Score aggregation and completion breakdowns.
//!
//! A score is never stored. It is the sum of points over solved challenges, re-derived from a
//! ledger snapshot each time, so it cannot drift from the submission history. Because
//! "solved" is a boolean, duplicate correct submissions never add credit twice.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::clock::Timestamp;
use crate::domain::{Challenge, ChallengeProgress, Difficulty};
use crate::ledger::LedgerSnapshot;
use crate::progress::compute_progress;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedChallenge {
  pub challenge_id: String,
  pub points: u32,
  pub solved_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScore {
  pub user_id: String,
  pub total: u64,
  /// Ordered by solve time.
  pub solved: Vec<SolvedChallenge>,
  /// Earliest time the current total was reached; `None` while the total is zero.
  pub score_reached_at: Option<Timestamp>,
}

impl UserScore {
  pub fn solved_count(&self) -> usize {
    self.solved.len()
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Completion {
  pub total: usize,
  pub solved: usize,
  pub percentage: u32,
}

impl Completion {
  fn tally(&mut self, solved: bool) {
    self.total += 1;
    if solved {
      self.solved += 1;
    }
  }

  fn finish(mut self) -> Self {
    self.percentage = percentage(self.solved, self.total);
    self
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
  pub user_id: String,
  pub total_score: u64,
  /// Position on the overall leaderboard. Set by the caller, which owns the ranking inputs.
  pub rank: Option<u32>,
  pub solved_count: usize,
  pub total_count: usize,
  pub completion_percentage: u32,
  pub by_category: BTreeMap<String, Completion>,
  pub by_difficulty: BTreeMap<&'static str, Completion>,
  pub solved_challenge_ids: Vec<String>,
  pub challenges: Vec<ChallengeProgress>,
  /// Challenges whose multi-part spec failed validation (flagged in admin views).
  pub misconfigured: Vec<String>,
}

/// `round(100 * solved / total)`, half rounding up; an empty group is 0%.
pub fn percentage(solved: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  ((200 * solved + total) / (2 * total)) as u32
}

/// Progress for every challenge in `challenges` (callers pass an already-scoped list).
pub fn progress_for_user(user_id: &str, challenges: &[Challenge], ledger: &LedgerSnapshot) -> Vec<ChallengeProgress> {
  let groups = ledger.by_challenge_for_user(user_id);
  challenges
    .iter()
    .map(|ch| {
      let entries = groups.get(ch.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
      compute_progress(user_id, ch, entries.iter().copied())
    })
    .collect()
}

pub fn compute_user_score(user_id: &str, challenges: &[Challenge], ledger: &LedgerSnapshot) -> UserScore {
  let progress = progress_for_user(user_id, challenges, ledger);
  score_from_progress(user_id, challenges, &progress)
}

fn score_from_progress(user_id: &str, challenges: &[Challenge], progress: &[ChallengeProgress]) -> UserScore {
  let mut solved: Vec<SolvedChallenge> = challenges
    .iter()
    .zip(progress)
    .filter_map(|(ch, p)| {
      p.first_solved_at.filter(|_| p.solved).map(|at| SolvedChallenge {
        challenge_id: ch.id.clone(),
        points: ch.points,
        solved_at: at,
      })
    })
    .collect();
  solved.sort_by(|a, b| a.solved_at.cmp(&b.solved_at).then_with(|| a.challenge_id.cmp(&b.challenge_id)));

  let total: u64 = solved.iter().map(|s| u64::from(s.points)).sum();
  let mut running = 0u64;
  let mut score_reached_at = None;
  if total > 0 {
    for s in &solved {
      running += u64::from(s.points);
      if running == total {
        score_reached_at = Some(s.solved_at);
        break;
      }
    }
  }

  UserScore { user_id: user_id.to_string(), total, solved, score_reached_at }
}

/// Completion report: overall, by category, and by difficulty (all three difficulties are
/// always present, even when empty).
pub fn build_progress_report(user_id: &str, challenges: &[Challenge], ledger: &LedgerSnapshot) -> ProgressReport {
  let progress = progress_for_user(user_id, challenges, ledger);
  let score = score_from_progress(user_id, challenges, &progress);

  let mut by_category: BTreeMap<String, Completion> = BTreeMap::new();
  let mut by_difficulty: BTreeMap<&'static str, Completion> =
    Difficulty::ALL.iter().map(|d| (d.as_str(), Completion::default())).collect();
  let mut solved_challenge_ids = Vec::new();
  let mut misconfigured = Vec::new();

  for (ch, p) in challenges.iter().zip(&progress) {
    by_category.entry(ch.category.clone()).or_default().tally(p.solved);
    by_difficulty.entry(ch.difficulty.as_str()).or_default().tally(p.solved);
    if p.solved {
      solved_challenge_ids.push(ch.id.clone());
    }
    if ch.misconfiguration().is_some() {
      misconfigured.push(ch.id.clone());
    }
  }

  let solved_count = solved_challenge_ids.len();
  let total_count = challenges.len();
  ProgressReport {
    user_id: user_id.to_string(),
    total_score: score.total,
    rank: None,
    solved_count,
    total_count,
    completion_percentage: percentage(solved_count, total_count),
    by_category: by_category.into_iter().map(|(k, v)| (k, v.finish())).collect(),
    by_difficulty: by_difficulty.into_iter().map(|(k, v)| (k, v.finish())).collect(),
    solved_challenge_ids,
    challenges: progress,
    misconfigured,
  }
}
