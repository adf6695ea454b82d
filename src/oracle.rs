//! Flag verification seam.
//!
//! The engine only needs a verdict: was the attempt correct and, for multi-part challenges,
//! which part did it satisfy. `FlagBook` is the built-in exact-match implementation fed from
//! configuration; anything else (hashed secrets, regex flags, a remote checker) plugs in
//! through `VerificationOracle`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Verdict {
  pub correct: bool,
  pub part_key: Option<String>,
}

impl Verdict {
  pub fn wrong() -> Self {
    Self::default()
  }

  pub fn correct(part_key: Option<String>) -> Self {
    Self { correct: true, part_key }
  }
}

pub trait VerificationOracle: Send + Sync {
  fn verify(&self, challenge_id: &str, submitted: &str) -> Verdict;
}

#[derive(Clone, Debug)]
pub enum Secret {
  Single(String),
  Parts(BTreeMap<String, String>),
}

/// Exact-match secrets keyed by challenge id.
#[derive(Default)]
pub struct FlagBook {
  secrets: RwLock<HashMap<String, Secret>>,
}

impl FlagBook {
  pub fn new() -> Self {
    Self::default()
  }

  /// A poisoned lock is recovered: the map holds whole entries only, so it is still consistent.
  pub fn set(&self, challenge_id: &str, secret: Secret) {
    let mut secrets = self.secrets.write().unwrap_or_else(|poisoned| {
      warn!(target: "config", %challenge_id, "Flag book lock was poisoned; recovering");
      PoisonError::into_inner(poisoned)
    });
    secrets.insert(challenge_id.to_string(), secret);
  }
}

impl VerificationOracle for FlagBook {
  fn verify(&self, challenge_id: &str, submitted: &str) -> Verdict {
    let secrets = self.secrets.read().unwrap_or_else(PoisonError::into_inner);
    match secrets.get(challenge_id) {
      Some(Secret::Single(flag)) if flag == submitted => Verdict::correct(None),
      Some(Secret::Parts(parts)) => parts
        .iter()
        .find(|(_, flag)| flag.as_str() == submitted)
        .map(|(key, _)| Verdict::correct(Some(key.clone())))
        .unwrap_or_else(Verdict::wrong),
      _ => Verdict::wrong(),
    }
  }
}
