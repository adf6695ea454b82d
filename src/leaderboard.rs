//! Leaderboard ordering and rank numbering.
//!
//! Order: score descending, then the time the score was reached ascending, then user id.
//! The last key makes the order total, so the same input always gives the same board.
//! Ranks use competition numbering: scores `[100, 100, 80]` rank `[1, 1, 3]`.

use std::cmp::Ordering;

use serde::Serialize;

use crate::clock::Timestamp;
use crate::score::UserScore;

/// Input row for ranking.
#[derive(Clone, Debug)]
pub struct Standing {
  pub user_id: String,
  pub username: String,
  pub total_score: u64,
  pub solved_count: usize,
  pub score_reached_at: Option<Timestamp>,
}

impl Standing {
  pub fn new(username: &str, score: &UserScore) -> Self {
    Self {
      user_id: score.user_id.clone(),
      username: username.to_string(),
      total_score: score.total,
      solved_count: score.solved_count(),
      score_reached_at: score.score_reached_at,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
  pub rank: u32,
  pub user_id: String,
  pub username: String,
  pub total_score: u64,
  pub solved_count: usize,
  pub score_reached_at: Option<Timestamp>,
}

fn board_order(a: &Standing, b: &Standing) -> Ordering {
  b.total_score
    .cmp(&a.total_score)
    // `None` (score still zero) sorts first: that score was held from the start.
    .then_with(|| a.score_reached_at.cmp(&b.score_reached_at))
    .then_with(|| a.user_id.cmp(&b.user_id))
}

/// 1-based position for a 0-based index, saturating at `u32::MAX`.
fn ordinal(index: usize) -> u32 {
  u32::try_from(index).map_or(u32::MAX, |i| i.saturating_add(1))
}

pub fn rank(mut standings: Vec<Standing>) -> Vec<LeaderboardEntry> {
  standings.sort_by(board_order);

  let mut out: Vec<LeaderboardEntry> = Vec::with_capacity(standings.len());
  for (i, s) in standings.into_iter().enumerate() {
    let rank = match out.last() {
      Some(prev) if prev.total_score == s.total_score => prev.rank,
      _ => ordinal(i),
    };
    out.push(LeaderboardEntry {
      rank,
      user_id: s.user_id,
      username: s.username,
      total_score: s.total_score,
      solved_count: s.solved_count,
      score_reached_at: s.score_reached_at,
    });
  }
  out
}
