//! Domain models: challenges (with optional multi-part specs), submissions, and the derived
//! per-challenge progress record.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Timestamp;

/// Part key used for challenges that have a single flag.
pub const IMPLICIT_PART: &str = "flag";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

  pub fn as_str(&self) -> &'static str {
    match self {
      Difficulty::Easy => "Easy",
      Difficulty::Medium => "Medium",
      Difficulty::Hard => "Hard",
    }
  }
}

/// Which challenges count: the player view (active only) or the admin "show hidden" view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Scope {
  #[default]
  ActiveOnly,
  IncludeHidden,
}

impl Scope {
  pub fn from_include_hidden(include_hidden: bool) -> Self {
    if include_hidden { Scope::IncludeHidden } else { Scope::ActiveOnly }
  }

  pub fn admits(&self, ch: &Challenge) -> bool {
    match self {
      Scope::ActiveOnly => ch.active,
      Scope::IncludeHidden => true,
    }
  }
}

/// Multi-part configuration after validation of the loosely typed payload.
///
/// A misconfigured spec keeps the raw payload so admin views can show what was wrong.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MultiPartSpec {
  Valid { parts: BTreeMap<String, String> },
  Misconfigured { raw: String, reason: String },
}

impl MultiPartSpec {
  /// Accepts either a table of part-key -> template, or a string holding a JSON object of the same.
  pub fn parse(raw: &toml::Value) -> Self {
    match raw {
      toml::Value::Table(table) => {
        let mut parts = BTreeMap::new();
        for (key, value) in table {
          match value {
            toml::Value::String(tpl) => { parts.insert(key.clone(), tpl.clone()); }
            other => {
              return MultiPartSpec::Misconfigured {
                raw: raw.to_string(),
                reason: format!("part '{}' is a {}, expected a string", key, other.type_str()),
              };
            }
          }
        }
        Self::from_parts(parts, raw.to_string())
      }
      toml::Value::String(s) => Self::parse_json(s),
      other => MultiPartSpec::Misconfigured {
        raw: other.to_string(),
        reason: format!("expected a table of part templates, got a {}", other.type_str()),
      },
    }
  }

  pub fn parse_json(s: &str) -> Self {
    let value: serde_json::Value = match serde_json::from_str(s) {
      Ok(v) => v,
      Err(e) => {
        return MultiPartSpec::Misconfigured { raw: s.to_string(), reason: format!("invalid JSON: {}", e) };
      }
    };
    let Some(obj) = value.as_object() else {
      return MultiPartSpec::Misconfigured { raw: s.to_string(), reason: "expected a JSON object".into() };
    };
    let mut parts = BTreeMap::new();
    for (key, v) in obj {
      match v.as_str() {
        Some(tpl) => { parts.insert(key.clone(), tpl.to_string()); }
        None => {
          return MultiPartSpec::Misconfigured {
            raw: s.to_string(),
            reason: format!("part '{}' is not a string", key),
          };
        }
      }
    }
    Self::from_parts(parts, s.to_string())
  }

  fn from_parts(parts: BTreeMap<String, String>, raw: String) -> Self {
    if parts.is_empty() {
      MultiPartSpec::Misconfigured { raw, reason: "no parts declared".into() }
    } else {
      MultiPartSpec::Valid { parts }
    }
  }
}

/// Challenge definition as held by the catalog. Secrets live with the oracle, not here.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
  pub id: String,
  pub title: String,
  pub points: u32,
  pub difficulty: Difficulty,
  pub category: String,
  pub active: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parts: Option<MultiPartSpec>,
}

impl Challenge {
  /// Declared parts, only when the spec validated.
  pub fn valid_parts(&self) -> Option<&BTreeMap<String, String>> {
    match &self.parts {
      Some(MultiPartSpec::Valid { parts }) => Some(parts),
      _ => None,
    }
  }

  /// Part keys that must all be completed before the challenge counts as solved.
  pub fn required_parts(&self) -> BTreeSet<String> {
    match self.valid_parts() {
      Some(parts) => parts.keys().cloned().collect(),
      None => BTreeSet::from([IMPLICIT_PART.to_string()]),
    }
  }

  pub fn misconfiguration(&self) -> Option<&str> {
    match &self.parts {
      Some(MultiPartSpec::Misconfigured { reason, .. }) => Some(reason),
      _ => None,
    }
  }
}

/// One ledger entry. Immutable once recorded.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  pub id: Uuid,
  /// Append order; breaks ties between entries that share a timestamp.
  pub seq: u64,
  pub user_id: String,
  pub challenge_id: String,
  pub submitted: String,
  pub at: Timestamp,
  pub correct: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub part_key: Option<String>,
}

/// Everything needed to append a submission; the ledger assigns id and seq.
#[derive(Clone, Debug)]
pub struct NewSubmission {
  pub user_id: String,
  pub challenge_id: String,
  pub submitted: String,
  pub at: Timestamp,
  pub correct: bool,
  pub part_key: Option<String>,
}

/// Derived per (user, challenge). Never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeProgress {
  pub challenge_id: String,
  pub completed_parts: BTreeSet<String>,
  pub required_parts: BTreeSet<String>,
  pub solved: bool,
  pub first_solved_at: Option<Timestamp>,
}
