//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Challenge, Difficulty};
use crate::leaderboard::LeaderboardEntry;
use crate::score::ProgressReport;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
  Ping,
  SubmitFlag {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(rename = "challengeId")]
    challenge_id: String,
    flag: String,
  },
  GetProgress {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(default, rename = "includeHidden")]
    include_hidden: bool,
  },
  GetLeaderboard {
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    category: Option<String>,
  },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
  Pong,
  SubmitResult {
    result: SubmitOut,
  },
  Progress {
    progress: ProgressReport,
  },
  Leaderboard {
    entries: Vec<LeaderboardEntry>,
  },
  Error {
    message: String,
  },
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOut {
  pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterIn {
  pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitIn {
  pub user_id: String,
  pub flag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOut {
  pub correct: bool,
  pub newly_solved: bool,
  pub score_delta: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub part_key: Option<String>,
  pub message: String,
  pub total_score: u64,
}

#[derive(Debug, Deserialize, Default)]
pub struct ScopeQuery {
  #[serde(default)]
  pub include_hidden: bool,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
  pub user_id: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct LeaderboardQuery {
  #[serde(default)]
  pub limit: Option<usize>,
  /// Rank by points from this category only.
  #[serde(default)]
  pub category: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResetChallengeIn {
  #[serde(default)]
  pub user_id: Option<String>,
}

/// Challenge as shown to players: no secrets, templates only.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeOut {
  pub id: String,
  pub title: String,
  pub points: u32,
  pub difficulty: Difficulty,
  pub category: String,
  pub hidden: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parts: Option<Vec<PartOut>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub misconfigured: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PartOut {
  pub key: String,
  pub template: String,
}

pub fn to_out(c: &Challenge) -> ChallengeOut {
  let parts = c.valid_parts().map(|parts| {
    parts
      .iter()
      .map(|(k, t)| PartOut { key: k.clone(), template: t.clone() })
      .collect()
  });
  ChallengeOut {
    id: c.id.clone(),
    title: c.title.clone(),
    points: c.points,
    difficulty: c.difficulty,
    category: c.category.clone(),
    hidden: !c.active,
    parts,
    misconfigured: c.misconfiguration().map(str::to_string),
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOut {
  pub total_users: usize,
  pub total_challenges: usize,
  pub total_submissions: usize,
  pub total_correct_submissions: usize,
  pub challenges: Vec<ChallengeStatOut>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeStatOut {
  pub challenge_id: String,
  pub title: String,
  pub attempts: usize,
  pub correct_attempts: usize,
  /// Distinct users for whom the challenge is solved.
  pub solves: usize,
}
