//! Per (user, challenge) solved-state derivation.
//!
//! Pure: the same submissions and challenge always give the same `ChallengeProgress`.
//! Called by the submit path and by every read path.

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::{Challenge, ChallengeProgress, Submission, IMPLICIT_PART};

/// Derive progress for `user_id` on `challenge`.
///
/// Entries for other users or challenges, and incorrect attempts, are ignored. For a
/// multi-part challenge a correct entry counts only if its part key is one of the declared
/// parts. A misconfigured spec falls back to single-part semantics.
pub fn compute_progress<'a, I>(user_id: &str, challenge: &Challenge, submissions: I) -> ChallengeProgress
where
  I: IntoIterator<Item = &'a Submission>,
{
  let mut correct: Vec<&Submission> = submissions
    .into_iter()
    .filter(|s| s.correct && s.user_id == user_id && s.challenge_id == challenge.id)
    .collect();
  correct.sort_by_key(|s| (s.at, s.seq));

  let required = challenge.required_parts();
  let mut completed = BTreeSet::new();
  let mut first_solved_at = None;

  match challenge.valid_parts() {
    Some(parts) => {
      for s in correct {
        let Some(key) = s.part_key.as_deref() else {
          debug!(target: "submission", challenge = %challenge.id, id = %s.id, "Correct entry without part key ignored");
          continue;
        };
        if !parts.contains_key(key) {
          debug!(target: "submission", challenge = %challenge.id, id = %s.id, part = key, "Correct entry for undeclared part ignored");
          continue;
        }
        if completed.insert(key.to_string()) && first_solved_at.is_none() && completed.len() == required.len() {
          first_solved_at = Some(s.at);
        }
      }
    }
    None => {
      if let Some(reason) = challenge.misconfiguration() {
        debug!(target: "config", challenge = %challenge.id, %reason, "Deriving misconfigured challenge as single-part");
      }
      if let Some(first) = correct.first() {
        completed.insert(IMPLICIT_PART.to_string());
        first_solved_at = Some(first.at);
      }
    }
  }

  ChallengeProgress {
    challenge_id: challenge.id.clone(),
    solved: first_solved_at.is_some(),
    completed_parts: completed,
    required_parts: required,
    first_solved_at,
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::domain::{Difficulty, MultiPartSpec};
  use std::collections::BTreeMap;
  use uuid::Uuid;

  pub(crate) fn single(id: &str, points: u32) -> Challenge {
    Challenge {
      id: id.into(),
      title: id.to_uppercase(),
      points,
      difficulty: Difficulty::Easy,
      category: "Cryptography".into(),
      active: true,
      parts: None,
    }
  }

  pub(crate) fn multi(id: &str, points: u32, keys: &[&str]) -> Challenge {
    let parts: BTreeMap<String, String> =
      keys.iter().map(|k| (k.to_string(), format!("{}{{...}}", k))).collect();
    Challenge { parts: Some(MultiPartSpec::Valid { parts }), ..single(id, points) }
  }

  pub(crate) fn entry(seq: u64, user: &str, challenge: &str, at: u64, correct: bool, part: Option<&str>) -> Submission {
    Submission {
      id: Uuid::new_v4(),
      seq,
      user_id: user.into(),
      challenge_id: challenge.into(),
      submitted: "flag{x}".into(),
      at,
      correct,
      part_key: part.map(str::to_string),
    }
  }

  #[test]
  fn single_part_is_solved_by_first_correct_entry() {
    let ch = single("c1", 100);
    let subs = vec![
      entry(0, "u", "c1", 5, false, None),
      entry(1, "u", "c1", 9, true, None),
      entry(2, "u", "c1", 12, true, None),
    ];
    let p = compute_progress("u", &ch, &subs);
    assert!(p.solved);
    assert_eq!(p.first_solved_at, Some(9));
    assert_eq!(p.completed_parts, BTreeSet::from([IMPLICIT_PART.to_string()]));
  }

  #[test]
  fn wrong_attempts_only_leave_it_unsolved() {
    let ch = single("c1", 100);
    let subs = vec![entry(0, "u", "c1", 5, false, None)];
    let p = compute_progress("u", &ch, &subs);
    assert!(!p.solved);
    assert!(p.completed_parts.is_empty());
    assert_eq!(p.first_solved_at, None);
  }

  #[test]
  fn multi_part_needs_every_part_in_either_order() {
    let ch = multi("c2", 150, &["a", "b"]);

    let only_a = vec![entry(0, "u", "c2", 1, true, Some("a"))];
    assert!(!compute_progress("u", &ch, &only_a).solved);

    let b_then_a = vec![entry(0, "u", "c2", 1, true, Some("b")), entry(1, "u", "c2", 4, true, Some("a"))];
    let p = compute_progress("u", &ch, &b_then_a);
    assert!(p.solved);
    assert_eq!(p.first_solved_at, Some(4));

    let a_then_b = vec![entry(0, "u", "c2", 2, true, Some("a")), entry(1, "u", "c2", 3, true, Some("b"))];
    assert_eq!(compute_progress("u", &ch, &a_then_b).first_solved_at, Some(3));
  }

  #[test]
  fn repeated_part_does_not_complete_the_challenge() {
    let ch = multi("c2", 150, &["a", "b"]);
    let subs = vec![entry(0, "u", "c2", 1, true, Some("a")), entry(1, "u", "c2", 2, true, Some("a"))];
    let p = compute_progress("u", &ch, &subs);
    assert!(!p.solved);
    assert_eq!(p.completed_parts.len(), 1);
  }

  #[test]
  fn solve_time_is_when_the_last_missing_part_arrived() {
    let ch = multi("c2", 150, &["a", "b"]);
    let subs = vec![
      entry(0, "u", "c2", 1, true, Some("a")),
      entry(1, "u", "c2", 6, true, Some("b")),
      entry(2, "u", "c2", 9, true, Some("a")),
    ];
    assert_eq!(compute_progress("u", &ch, &subs).first_solved_at, Some(6));
  }

  #[test]
  fn stale_or_missing_part_keys_are_ignored() {
    let ch = multi("c2", 150, &["a", "b"]);
    let subs = vec![
      entry(0, "u", "c2", 1, true, Some("a")),
      entry(1, "u", "c2", 2, true, Some("zzz")),
      entry(2, "u", "c2", 3, true, None),
    ];
    let p = compute_progress("u", &ch, &subs);
    assert!(!p.solved);
    assert_eq!(p.completed_parts, BTreeSet::from(["a".to_string()]));
  }

  #[test]
  fn misconfigured_spec_is_solved_by_any_correct_entry() {
    let mut ch = single("c3", 50);
    ch.parts = Some(MultiPartSpec::Misconfigured { raw: "{}".into(), reason: "no parts declared".into() });
    let subs = vec![entry(0, "u", "c3", 7, true, Some("whatever"))];
    let p = compute_progress("u", &ch, &subs);
    assert!(p.solved);
    assert_eq!(p.first_solved_at, Some(7));
  }

  #[test]
  fn other_users_entries_do_not_leak() {
    let ch = single("c1", 100);
    let subs = vec![entry(0, "someone-else", "c1", 1, true, None), entry(1, "u", "c9", 1, true, None)];
    assert!(!compute_progress("u", &ch, &subs).solved);
  }

  #[test]
  fn input_order_does_not_matter() {
    let ch = multi("c2", 150, &["a", "b"]);
    let mut subs = vec![
      entry(0, "u", "c2", 1, true, Some("a")),
      entry(1, "u", "c2", 5, true, Some("b")),
      entry(2, "u", "c2", 8, true, Some("b")),
    ];
    let forward = compute_progress("u", &ch, &subs);
    subs.reverse();
    assert_eq!(compute_progress("u", &ch, &subs), forward);
  }
}
