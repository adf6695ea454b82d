//! Loading scoreboard configuration (engine settings, challenge bank, users) from TOML.
//!
//! See `ScoreboardConfig` and `ChallengeCfg` for the expected schema.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Challenge, Difficulty, MultiPartSpec};
use crate::oracle::Secret;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ScoreboardConfig {
  #[serde(default)]
  pub engine: EngineSettings,
  #[serde(default)]
  pub challenges: Vec<ChallengeCfg>,
  #[serde(default)]
  pub users: Vec<UserCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EngineSettings {
  #[serde(default = "default_max_flag_len")]
  pub max_flag_len: usize,
  #[serde(default = "default_leaderboard_limit")]
  pub leaderboard_limit: usize,
  /// Load the built-in sample challenges alongside the configured ones.
  #[serde(default = "default_true")]
  pub seed_sample_data: bool,
}

fn default_max_flag_len() -> usize { 500 }
fn default_leaderboard_limit() -> usize { 50 }
fn default_true() -> bool { true }

impl Default for EngineSettings {
  fn default() -> Self {
    Self {
      max_flag_len: default_max_flag_len(),
      leaderboard_limit: default_leaderboard_limit(),
      seed_sample_data: true,
    }
  }
}

/// Challenge entry accepted in TOML configuration.
/// Single-part challenges set `flag`; multi-part ones set `parts` (display templates) and
/// `part_flags` (secrets, same keys).
#[derive(Clone, Debug, Deserialize)]
pub struct ChallengeCfg {
  pub id: String,
  pub title: String,
  pub points: u32,
  pub difficulty: Difficulty,
  pub category: String,
  #[serde(default)] pub hidden: bool,
  #[serde(default)] pub flag: Option<String>,
  /// Loosely typed on purpose: validated into `MultiPartSpec`.
  #[serde(default)] pub parts: Option<toml::Value>,
  #[serde(default)] pub part_flags: BTreeMap<String, String>,
}

impl ChallengeCfg {
  pub fn to_challenge(&self) -> Challenge {
    Challenge {
      id: self.id.clone(),
      title: self.title.clone(),
      points: self.points,
      difficulty: self.difficulty,
      category: self.category.clone(),
      active: !self.hidden,
      parts: self.parts.as_ref().map(|raw| self.check_secrets(raw, MultiPartSpec::parse(raw))),
    }
  }

  /// A declared part set is only usable when `part_flags` carries a secret for exactly those
  /// keys. Anything else is downgraded to a misconfiguration (scored as single-part), which the
  /// catalog reports when the challenge is inserted.
  fn check_secrets(&self, raw: &toml::Value, spec: MultiPartSpec) -> MultiPartSpec {
    let MultiPartSpec::Valid { parts } = &spec else {
      return spec;
    };
    let declared: Vec<&str> = parts.keys().map(String::as_str).collect();
    let secrets: Vec<&str> = self.part_flags.keys().map(String::as_str).collect();
    let reason = if secrets.is_empty() {
      format!("parts [{}] are declared but no part_flags are configured", declared.join(", "))
    } else if secrets != declared {
      format!(
        "part_flags keys [{}] do not match declared parts [{}]",
        secrets.join(", "),
        declared.join(", ")
      )
    } else {
      return spec;
    };
    MultiPartSpec::Misconfigured { raw: raw.to_string(), reason }
  }

  /// Secret for the built-in oracle, if one is configured.
  pub fn secret(&self) -> Option<Secret> {
    if !self.part_flags.is_empty() {
      Some(Secret::Parts(self.part_flags.clone()))
    } else {
      self.flag.clone().map(Secret::Single)
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct UserCfg {
  #[serde(default)] pub id: Option<String>,
  pub username: String,
}

pub fn parse_config(s: &str) -> Result<ScoreboardConfig, toml::de::Error> {
  toml::from_str::<ScoreboardConfig>(s)
}

/// Attempt to load `ScoreboardConfig` from CTF_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<ScoreboardConfig> {
  let path = std::env::var("CTF_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "config", %path, challenges = cfg.challenges.len(), users = cfg.users.len(), "Loaded scoreboard config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "config", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "config", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
