//! Application state: catalog, ledger, users, oracle, locks, and the leaderboard memo.
//!
//! This module owns:
//!   - the challenge catalog and the flag book behind the verification oracle
//!   - the append-only submission ledger (the only state scores are derived from)
//!   - the user directory
//!   - per (user, challenge) submit locks
//!   - a leaderboard memo per category filter, keyed by the versions it was computed from
//!
//! Nothing here stores a score. Scores and ranks are re-derived from the ledger on read.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, instrument};

use crate::catalog::ChallengeCatalog;
use crate::clock::{Clock, SystemClock};
use crate::config::{load_config_from_env, EngineSettings, ScoreboardConfig};
use crate::leaderboard::LeaderboardEntry;
use crate::ledger::SubmissionLedger;
use crate::locks::EntityLocks;
use crate::oracle::{FlagBook, VerificationOracle};
use crate::seeds::seed_challenges;
use crate::users::UserDirectory;

/// Versions of (ledger, catalog, users) a derivation was computed from.
pub type DerivationKey = (u64, u64, u64);

struct CachedBoard {
    key: DerivationKey,
    entries: Vec<LeaderboardEntry>,
}

pub struct AppState {
    pub catalog: ChallengeCatalog,
    pub ledger: SubmissionLedger,
    pub users: UserDirectory,
    pub oracle: Arc<dyn VerificationOracle>,
    pub locks: EntityLocks,
    pub clock: Arc<dyn Clock>,
    pub settings: EngineSettings,
    boards: Mutex<HashMap<Option<String>, CachedBoard>>,
}

impl AppState {
    /// Build state from env: load config, seed challenges, register configured users.
    #[instrument(level = "info", skip_all)]
    pub async fn from_env() -> Self {
        let cfg = load_config_from_env().unwrap_or_default();
        Self::from_config(cfg, Arc::new(SystemClock)).await
    }

    #[instrument(level = "info", skip_all)]
    pub async fn from_config(cfg: ScoreboardConfig, clock: Arc<dyn Clock>) -> Self {
        let catalog = ChallengeCatalog::new();
        let flags = FlagBook::new();

        let mut bank = cfg.challenges.clone();
        if cfg.engine.seed_sample_data {
            // Configured challenges win over built-in seeds with the same id.
            for seed in seed_challenges() {
                if !bank.iter().any(|c| c.id == seed.id) {
                    bank.push(seed);
                }
            }
        }

        let mut count_by_diff: HashMap<&'static str, (usize, usize)> = HashMap::new();
        for cc in &bank {
            let ch = cc.to_challenge();
            let entry = count_by_diff.entry(ch.difficulty.as_str()).or_insert((0, 0));
            if ch.active { entry.0 += 1 } else { entry.1 += 1 }

            match cc.secret() {
                Some(secret) => flags.set(&cc.id, secret),
                None => error!(target: "config", id = %cc.id, "No flag configured; every submission will be judged incorrect"),
            }
            catalog.insert(ch).await;
        }
        for (diff, (active, hidden)) in count_by_diff {
            info!(target: "ctf_scoreboard", %diff, active, hidden, "Startup challenge inventory");
        }

        let users = UserDirectory::new();
        for uc in &cfg.users {
            if let Err(e) = users.register(&uc.username, uc.id.clone(), clock.now()).await {
                error!(target: "config", username = %uc.username, error = %e, "Skipping configured user");
            }
        }

        Self {
            catalog,
            ledger: SubmissionLedger::new(),
            users,
            oracle: Arc::new(flags),
            locks: EntityLocks::new(),
            clock,
            settings: cfg.engine,
            boards: Mutex::new(HashMap::new()),
        }
    }

    /// Swap the verification oracle (e.g. a remote checker).
    #[cfg(test)]
    pub fn with_oracle(mut self, oracle: Arc<dyn VerificationOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Memoized board for `category` (`None` is the overall board), if computed at `key`.
    pub async fn cached_board(&self, key: DerivationKey, category: Option<&str>) -> Option<Vec<LeaderboardEntry>> {
        let boards = self.boards.lock().await;
        boards
            .get(&category.map(str::to_string))
            .filter(|b| b.key == key)
            .map(|b| b.entries.clone())
    }

    /// Boards computed at other versions are dropped on store.
    pub async fn store_board(&self, key: DerivationKey, category: Option<&str>, entries: Vec<LeaderboardEntry>) {
        let mut boards = self.boards.lock().await;
        boards.retain(|_, b| b.key == key);
        boards.insert(category.map(str::to_string), CachedBoard { key, entries });
    }

    /// Forget memoized derivations so the next read is computed fresh.
    pub async fn invalidate_derivations(&self) {
        self.boards.lock().await.clear();
    }
}
