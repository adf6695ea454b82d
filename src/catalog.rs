//! Challenge catalog: the registry of challenge definitions.
//!
//! Reads are the engine's view of the catalog. `toggle_visibility` and `delete` are the admin
//! mutations. They only change which challenges count from now on. Ledger history is untouched.

use std::collections::BTreeMap;

use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::domain::{Challenge, Scope};
use crate::error::EngineError;

#[derive(Default)]
struct CatalogInner {
    by_id: BTreeMap<String, Challenge>,
    version: u64,
}

#[derive(Default)]
pub struct ChallengeCatalog {
    inner: RwLock<CatalogInner>,
}

impl ChallengeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a challenge definition.
    #[instrument(level = "debug", skip(self, ch), fields(id = %ch.id))]
    pub async fn insert(&self, ch: Challenge) {
        if let Some(reason) = ch.misconfiguration() {
            warn!(target: "config", id = %ch.id, %reason, "Multi-part spec is malformed; challenge will be scored as single-part");
        }
        let mut inner = self.inner.write().await;
        inner.by_id.insert(ch.id.clone(), ch);
        inner.version += 1;
    }

    pub async fn get_challenge(&self, id: &str) -> Option<Challenge> {
        self.inner.read().await.by_id.get(id).cloned()
    }

    /// Challenges admitted by `scope`, ordered by id.
    pub async fn list(&self, scope: Scope) -> Vec<Challenge> {
        self.snapshot(scope).await.0
    }

    /// Scoped listing together with the catalog version it was read at.
    pub async fn snapshot(&self, scope: Scope) -> (Vec<Challenge>, u64) {
        let inner = self.inner.read().await;
        let list = inner.by_id.values().filter(|c| scope.admits(c)).cloned().collect();
        (list, inner.version)
    }

    /// Flip the active flag and return the updated challenge.
    #[instrument(level = "info", skip(self))]
    pub async fn toggle_visibility(&self, id: &str) -> Result<Challenge, EngineError> {
        let mut inner = self.inner.write().await;
        let ch = inner.by_id.get_mut(id).ok_or_else(|| EngineError::challenge_not_found(id))?;
        ch.active = !ch.active;
        let updated = ch.clone();
        inner.version += 1;
        info!(target: "admin", %id, active = updated.active, "Challenge visibility toggled");
        Ok(updated)
    }

    #[instrument(level = "info", skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Challenge, EngineError> {
        let mut inner = self.inner.write().await;
        let removed = inner.by_id.remove(id).ok_or_else(|| EngineError::challenge_not_found(id))?;
        inner.version += 1;
        info!(target: "admin", %id, "Challenge deleted from catalog");
        Ok(removed)
    }

    #[cfg(test)]
    pub async fn version(&self) -> u64 {
        self.inner.read().await.version
    }
}
