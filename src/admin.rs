//! Admin resets and catalog mutations.
//!
//! Resets purge ledger entries in one atomic step. No score is decremented anywhere: the next
//! read re-derives everything from what is left. Catalog mutations (hide, delete) keep ledger
//! history, so unhiding a challenge restores the credit earned on it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::EngineError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminReport {
  pub message: String,
  pub deleted_submissions: usize,
  pub affected_users: usize,
}

fn distinct_users<'a, I: IntoIterator<Item = &'a str>>(ids: I) -> usize {
  ids.into_iter().collect::<BTreeSet<_>>().len()
}

#[instrument(level = "info", skip(state))]
pub async fn reset_user(state: &AppState, user_id: &str) -> Result<AdminReport, EngineError> {
  let user = state.users.require(user_id).await?;
  let removed = state.ledger.purge(|s| s.user_id == user_id).await;
  state.invalidate_derivations().await;
  info!(target: "admin", %user_id, removed = removed.len(), "User submissions purged");
  Ok(AdminReport {
    message: format!("Reset score and submissions for user {}", user.username),
    deleted_submissions: removed.len(),
    affected_users: 1,
  })
}

/// Display title for a reset target. Deleted challenges still qualify while the ledger holds
/// entries for them; they are named by id.
async fn reset_target_title(state: &AppState, challenge_id: &str) -> Result<String, EngineError> {
  match state.catalog.get_challenge(challenge_id).await {
    Some(ch) => Ok(ch.title),
    None if !state.ledger.query_all(challenge_id).await.is_empty() => Ok(challenge_id.to_string()),
    None => Err(EngineError::challenge_not_found(challenge_id)),
  }
}

/// Purge every entry for a challenge, across all users.
#[instrument(level = "info", skip(state))]
pub async fn reset_challenge(state: &AppState, challenge_id: &str) -> Result<AdminReport, EngineError> {
  let title = reset_target_title(state, challenge_id).await?;
  let removed = state.ledger.purge(|s| s.challenge_id == challenge_id).await;
  state.invalidate_derivations().await;
  let affected_users = distinct_users(removed.iter().map(|s| s.user_id.as_str()));
  info!(target: "admin", %challenge_id, removed = removed.len(), affected_users, "Challenge submissions purged");
  Ok(AdminReport {
    message: format!("Reset all submissions for challenge: {}", title),
    deleted_submissions: removed.len(),
    affected_users,
  })
}

#[instrument(level = "info", skip(state))]
pub async fn reset_user_challenge(state: &AppState, user_id: &str, challenge_id: &str) -> Result<AdminReport, EngineError> {
  let user = state.users.require(user_id).await?;
  let title = reset_target_title(state, challenge_id).await?;
  let removed = state
    .ledger
    .purge(|s| s.user_id == user_id && s.challenge_id == challenge_id)
    .await;
  state.invalidate_derivations().await;
  info!(target: "admin", %user_id, %challenge_id, removed = removed.len(), "Pair submissions purged");
  Ok(AdminReport {
    message: format!("Reset submissions on {} for user {}", title, user.username),
    deleted_submissions: removed.len(),
    affected_users: 1,
  })
}

#[instrument(level = "info", skip(state))]
pub async fn toggle_visibility(state: &AppState, challenge_id: &str) -> Result<AdminReport, EngineError> {
  let ch = state.catalog.toggle_visibility(challenge_id).await?;
  state.invalidate_derivations().await;
  let entries = state.ledger.query_all(challenge_id).await;
  let status = if ch.active { "shown" } else { "hidden" };
  Ok(AdminReport {
    message: format!("Challenge \"{}\" {} successfully", ch.title, status),
    deleted_submissions: 0,
    affected_users: distinct_users(entries.iter().map(|s| s.user_id.as_str())),
  })
}

/// Remove a challenge from the catalog. Its ledger entries stay until explicitly reset.
#[instrument(level = "info", skip(state))]
pub async fn delete_challenge(state: &AppState, challenge_id: &str) -> Result<AdminReport, EngineError> {
  let ch = state.catalog.delete(challenge_id).await?;
  state.invalidate_derivations().await;
  let entries = state.ledger.query_all(challenge_id).await;
  Ok(AdminReport {
    message: format!("Challenge \"{}\" deleted successfully", ch.title),
    deleted_submissions: 0,
    affected_users: distinct_users(entries.iter().map(|s| s.user_id.as_str())),
  })
}
