//! Registered players. Authentication lives elsewhere; the engine only needs to know which
//! user ids exist and what to show on the leaderboard.

use std::collections::BTreeMap;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::clock::Timestamp;
use crate::error::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
  pub id: String,
  pub username: String,
  pub created_at: Timestamp,
}

#[derive(Default)]
struct UsersInner {
  by_id: BTreeMap<String, UserRecord>,
  version: u64,
}

#[derive(Default)]
pub struct UserDirectory {
  inner: RwLock<UsersInner>,
}

/// 3-20 characters of ASCII letters, digits, or underscore.
pub fn is_valid_username(name: &str) -> bool {
  (3..=20).contains(&name.len()) && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl UserDirectory {
  pub fn new() -> Self {
    Self::default()
  }

  #[instrument(level = "info", skip(self))]
  pub async fn register(&self, username: &str, id: Option<String>, at: Timestamp) -> Result<UserRecord, EngineError> {
    if !is_valid_username(username) {
      return Err(EngineError::Validation(format!(
        "username '{}' must be 3-20 letters, digits or underscores",
        username
      )));
    }
    let mut inner = self.inner.write().await;
    if inner.by_id.values().any(|u| u.username == username) {
      return Err(EngineError::Validation(format!("username '{}' is already taken", username)));
    }
    let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
    if inner.by_id.contains_key(&id) {
      return Err(EngineError::Validation(format!("user id '{}' is already registered", id)));
    }
    let user = UserRecord { id: id.clone(), username: username.to_string(), created_at: at };
    inner.by_id.insert(id, user.clone());
    inner.version += 1;
    info!(target: "ctf_scoreboard", id = %user.id, username = %user.username, "User registered");
    Ok(user)
  }

  pub async fn get(&self, id: &str) -> Option<UserRecord> {
    self.inner.read().await.by_id.get(id).cloned()
  }

  pub async fn require(&self, id: &str) -> Result<UserRecord, EngineError> {
    self.get(id).await.ok_or_else(|| EngineError::user_not_found(id))
  }

  /// All users with the directory version they were read at.
  pub async fn snapshot(&self) -> (Vec<UserRecord>, u64) {
    let inner = self.inner.read().await;
    (inner.by_id.values().cloned().collect(), inner.version)
  }
}
