//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Flag submission (sanitize, verify, append, derive the credit change)
//!   - Progress reports and the leaderboard, derived from a ledger snapshot on every read
//!   - Submission history and per-challenge stats

use std::collections::BTreeMap;
use std::iter::once;

use tracing::{debug, info, instrument, warn};

use crate::domain::{Challenge, ChallengeProgress, NewSubmission, Scope, Submission};
use crate::error::EngineError;
use crate::leaderboard::{rank, LeaderboardEntry, Standing};
use crate::ledger::LedgerSnapshot;
use crate::progress::compute_progress;
use crate::protocol::{to_out, ChallengeOut, ChallengeStatOut, StatsOut, SubmitOut};
use crate::score::{build_progress_report, compute_user_score, ProgressReport};
use crate::state::AppState;
use crate::users::UserRecord;
use crate::util::sanitize_flag;

pub async fn register_user(state: &AppState, username: &str) -> Result<UserRecord, EngineError> {
  state.users.register(username.trim(), None, state.clock.now()).await
}

pub async fn list_challenges(state: &AppState, scope: Scope) -> Vec<ChallengeOut> {
  state.catalog.list(scope).await.iter().map(to_out).collect()
}

/// Submit a flag attempt.
///
/// Validation and lookups happen before the ledger is touched. Verification, append and the
/// before/after derivation run under the (user, challenge) lock, and the "before" history is
/// captured by the ledger in the same step as the append.
#[instrument(level = "info", skip(state, flag), fields(%user_id, %challenge_id, flag_len = flag.len()))]
pub async fn submit(state: &AppState, user_id: &str, challenge_id: &str, flag: &str) -> Result<SubmitOut, EngineError> {
  state.users.require(user_id).await?;
  let challenge = state
    .catalog
    .get_challenge(challenge_id)
    .await
    .filter(|c| c.active)
    .ok_or_else(|| EngineError::challenge_not_found(challenge_id))?;

  let flag = sanitize_flag(flag);
  if flag.is_empty() {
    return Err(EngineError::Validation("flag must not be empty".into()));
  }
  if flag.chars().count() > state.settings.max_flag_len {
    return Err(EngineError::Validation(format!(
      "flag is longer than {} characters",
      state.settings.max_flag_len
    )));
  }

  let guard = state.locks.acquire(user_id, challenge_id).await;

  let verdict = state.oracle.verify(&challenge.id, &flag);
  let part_key = match (verdict.correct, challenge.valid_parts()) {
    (true, Some(parts)) => match verdict.part_key {
      Some(key) if parts.contains_key(&key) => Some(key),
      other => {
        warn!(target: "submission", challenge = %challenge.id, part = ?other, "Oracle reported a part the challenge does not declare");
        return Err(EngineError::Validation(format!(
          "unknown part key {:?} for challenge '{}'",
          other.unwrap_or_default(),
          challenge.id
        )));
      }
    },
    _ => None,
  };

  let appended = state
    .ledger
    .record(NewSubmission {
      user_id: user_id.to_string(),
      challenge_id: challenge.id.clone(),
      submitted: flag,
      at: state.clock.now(),
      correct: verdict.correct,
      part_key: part_key.clone(),
    })
    .await;

  let before = compute_progress(user_id, &challenge, &appended.prior);
  let after = compute_progress(user_id, &challenge, appended.prior.iter().chain(once(&appended.entry)));
  drop(guard);
  state.locks.release_idle().await;

  let newly_solved = !before.solved && after.solved;
  let score_delta = if newly_solved { u64::from(challenge.points) } else { 0 };
  let message = submit_message(verdict.correct, newly_solved, part_key.as_deref(), &before, &after);

  let (challenges, _) = state.catalog.snapshot(Scope::ActiveOnly).await;
  let ledger = state.ledger.snapshot().await;
  let total_score = compute_user_score(user_id, &challenges, &ledger).total;

  if newly_solved {
    info!(target: "submission", %user_id, challenge = %challenge.id, points = challenge.points, total_score, "Challenge solved");
  } else {
    info!(target: "submission", %user_id, challenge = %challenge.id, correct = verdict.correct, part = ?part_key, "Submission recorded");
  }

  Ok(SubmitOut { correct: verdict.correct, newly_solved, score_delta, part_key, message, total_score })
}

fn submit_message(
  correct: bool,
  newly_solved: bool,
  part_key: Option<&str>,
  before: &ChallengeProgress,
  after: &ChallengeProgress,
) -> String {
  if !correct {
    return "Incorrect flag".into();
  }
  match part_key {
    Some(_) if newly_solved => "Challenge completed! All parts solved!".into(),
    _ if newly_solved => "Correct flag!".into(),
    _ if before.solved => "Correct flag, but this challenge is already solved. No additional points.".into(),
    Some(key) if before.completed_parts.contains(key) => format!("Part {} was already submitted. No additional points.", key),
    Some(key) => format!(
      "Correct {}! Submit the remaining {} part(s) to complete the challenge.",
      key,
      after.required_parts.len() - after.completed_parts.len()
    ),
    None => "Correct flag!".into(),
  }
}

/// Progress in `scope`, plus the user's overall rank. Both come from one ledger snapshot, so
/// the rank matches the board read at the same version.
#[instrument(level = "info", skip(state), fields(%user_id))]
pub async fn get_progress(state: &AppState, user_id: &str, scope: Scope) -> Result<ProgressReport, EngineError> {
  state.users.require(user_id).await?;
  let (all, catalog_version) = state.catalog.snapshot(Scope::IncludeHidden).await;
  let ledger = state.ledger.snapshot().await;

  let scoped: Vec<Challenge> = all.iter().filter(|c| scope.admits(c)).cloned().collect();
  let mut report = build_progress_report(user_id, &scoped, &ledger);

  let active: Vec<Challenge> = all.into_iter().filter(|c| Scope::ActiveOnly.admits(c)).collect();
  let board = ranked_board(state, &active, catalog_version, &ledger, None).await;
  report.rank = board.iter().find(|e| e.user_id == user_id).map(|e| e.rank);

  debug!(target: "ctf_scoreboard", %user_id, solved = report.solved_count, total = report.total_count, score = report.total_score, rank = ?report.rank, "Progress derived");
  Ok(report)
}

/// Rank every registered user over `active`, or over its `category` subset. Memoized per
/// category at the (ledger, catalog, users) versions it was computed from.
async fn ranked_board(
  state: &AppState,
  active: &[Challenge],
  catalog_version: u64,
  ledger: &LedgerSnapshot,
  category: Option<&str>,
) -> Vec<LeaderboardEntry> {
  let (users, users_version) = state.users.snapshot().await;
  let key = (ledger.version(), catalog_version, users_version);

  let filtered: Vec<Challenge>;
  let challenges = match category {
    Some(cat) => {
      filtered = active.iter().filter(|c| c.category == cat).cloned().collect();
      filtered.as_slice()
    }
    None => active,
  };
  // Unknown categories are answered but not memoized, so arbitrary filters cannot grow the memo.
  let memoize = category.is_none() || !challenges.is_empty();

  if memoize {
    if let Some(board) = state.cached_board(key, category).await {
      return board;
    }
  }

  let standings = users
    .iter()
    .map(|u| Standing::new(&u.username, &compute_user_score(&u.id, challenges, ledger)))
    .collect();
  let board = rank(standings);
  debug!(target: "ctf_scoreboard", users = board.len(), ?category, ledger_version = key.0, "Leaderboard recomputed");
  if memoize {
    state.store_board(key, category, board.clone()).await;
  }
  board
}

/// Ranked leaderboard over every registered user, active challenges only. With `category`,
/// only points from challenges in that category count.
#[instrument(level = "info", skip(state))]
pub async fn get_leaderboard(state: &AppState, limit: Option<usize>, category: Option<&str>) -> Vec<LeaderboardEntry> {
  let (challenges, catalog_version) = state.catalog.snapshot(Scope::ActiveOnly).await;
  let ledger = state.ledger.snapshot().await;
  let board = ranked_board(state, &challenges, catalog_version, &ledger, category).await;
  board.into_iter().take(limit.unwrap_or(state.settings.leaderboard_limit)).collect()
}

/// One user's row of the overall leaderboard, without the limit applied.
#[instrument(level = "info", skip(state), fields(%user_id))]
pub async fn get_user_rank(state: &AppState, user_id: &str) -> Result<LeaderboardEntry, EngineError> {
  state.users.require(user_id).await?;
  let (challenges, catalog_version) = state.catalog.snapshot(Scope::ActiveOnly).await;
  let ledger = state.ledger.snapshot().await;
  ranked_board(state, &challenges, catalog_version, &ledger, None)
    .await
    .into_iter()
    .find(|e| e.user_id == user_id)
    .ok_or_else(|| EngineError::user_not_found(user_id))
}

/// Every attempt for the pair in time order, duplicates included.
pub async fn get_history(state: &AppState, user_id: &str, challenge_id: &str) -> Result<Vec<Submission>, EngineError> {
  state.users.require(user_id).await?;
  if state.catalog.get_challenge(challenge_id).await.is_none() {
    return Err(EngineError::challenge_not_found(challenge_id));
  }
  Ok(state.ledger.query(user_id, challenge_id).await)
}

pub async fn get_stats(state: &AppState, scope: Scope) -> StatsOut {
  let (users, _) = state.users.snapshot().await;
  let (challenges, _) = state.catalog.snapshot(scope).await;
  let ledger = state.ledger.snapshot().await;

  let stats = challenges
    .iter()
    .map(|ch| {
      let entries = ledger.query_all(&ch.id);
      let mut by_user: BTreeMap<&str, Vec<&Submission>> = BTreeMap::new();
      for s in entries.iter().copied() {
        by_user.entry(s.user_id.as_str()).or_default().push(s);
      }
      let solves = by_user
        .iter()
        .filter(|(user, subs)| compute_progress(user, ch, subs.iter().copied()).solved)
        .count();
      ChallengeStatOut {
        challenge_id: ch.id.clone(),
        title: ch.title.clone(),
        attempts: entries.len(),
        correct_attempts: entries.iter().filter(|s| s.correct).count(),
        solves,
      }
    })
    .collect();

  StatsOut {
    total_users: users.len(),
    total_challenges: challenges.len(),
    total_submissions: ledger.len(),
    total_correct_submissions: ledger.correct_count(),
    challenges: stats,
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::clock::ManualClock;
  use crate::config::parse_config;
  use crate::oracle::{Verdict, VerificationOracle};
  use std::sync::Arc;

  pub(crate) const TEST_CONFIG: &str = r#"
    [engine]
    seed_sample_data = false
    max_flag_len = 40

    [[challenges]]
    id = "c1"
    title = "Base64 Decode"
    points = 100
    difficulty = "Easy"
    category = "Cryptography"
    flag = "flag{c1}"

    [[challenges]]
    id = "c2"
    title = "Header Relay"
    points = 150
    difficulty = "Hard"
    category = "Web"
    parts = { flag1 = "flag1{...}", flag2 = "flag2{...}" }
    part_flags = { flag1 = "flag1{forwarded}", flag2 = "flag2{proxied}" }

    [[challenges]]
    id = "c3"
    title = "ROT13"
    points = 80
    difficulty = "Easy"
    category = "Cryptography"
    flag = "flag{c3}"

    [[challenges]]
    id = "secret"
    title = "Hidden Gem"
    points = 500
    difficulty = "Medium"
    category = "Misc"
    hidden = true
    flag = "flag{hidden}"

    [[users]]
    id = "u1"
    username = "alice"

    [[users]]
    id = "u2"
    username = "bob"

    [[users]]
    id = "u3"
    username = "carol"
  "#;

  pub(crate) async fn test_state() -> (Arc<AppState>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_000));
    let cfg = parse_config(TEST_CONFIG).unwrap();
    let state = AppState::from_config(cfg, clock.clone()).await;
    (Arc::new(state), clock)
  }

  #[tokio::test]
  async fn end_to_end_single_and_multi_part() {
    let (state, clock) = test_state().await;

    let wrong = submit(&state, "u1", "c1", "flag{nope}").await.unwrap();
    assert!(!wrong.correct);
    assert_eq!(wrong.total_score, 0);
    assert_eq!(wrong.score_delta, 0);

    clock.advance(10);
    let right = submit(&state, "u1", "c1", "flag{c1}").await.unwrap();
    assert!(right.correct && right.newly_solved);
    assert_eq!(right.score_delta, 100);
    assert_eq!(right.total_score, 100);

    clock.advance(10);
    let part1 = submit(&state, "u1", "c2", "flag1{forwarded}").await.unwrap();
    assert!(part1.correct);
    assert!(!part1.newly_solved);
    assert_eq!(part1.part_key.as_deref(), Some("flag1"));
    assert_eq!(part1.total_score, 100);

    clock.advance(10);
    let part2 = submit(&state, "u1", "c2", "flag2{proxied}").await.unwrap();
    assert!(part2.newly_solved);
    assert_eq!(part2.score_delta, 150);
    assert_eq!(part2.total_score, 250);
    assert_eq!(part2.message, "Challenge completed! All parts solved!");
  }

  #[tokio::test]
  async fn resubmitting_a_solved_flag_changes_nothing() {
    let (state, _) = test_state().await;
    submit(&state, "u1", "c1", "flag{c1}").await.unwrap();
    let again = submit(&state, "u1", "c1", "flag{c1}").await.unwrap();
    assert!(again.correct);
    assert!(!again.newly_solved);
    assert_eq!(again.score_delta, 0);
    assert_eq!(again.total_score, 100);

    // Both attempts stay in the history.
    assert_eq!(get_history(&state, "u1", "c1").await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn repeating_a_part_does_not_double_count() {
    let (state, _) = test_state().await;
    submit(&state, "u2", "c2", "flag1{forwarded}").await.unwrap();
    let dup = submit(&state, "u2", "c2", "flag1{forwarded}").await.unwrap();
    assert!(dup.correct && !dup.newly_solved);
    assert!(dup.message.contains("already submitted"), "{}", dup.message);

    let done = submit(&state, "u2", "c2", "flag2{proxied}").await.unwrap();
    assert!(done.newly_solved);
    let after = submit(&state, "u2", "c2", "flag2{proxied}").await.unwrap();
    assert_eq!(after.score_delta, 0);
    assert_eq!(after.total_score, 150);
  }

  #[tokio::test]
  async fn validation_and_lookup_failures_leave_the_ledger_alone() {
    let (state, _) = test_state().await;

    assert!(matches!(submit(&state, "u1", "c1", "   \n").await, Err(EngineError::Validation(_))));
    assert!(matches!(submit(&state, "u1", "c1", &"x".repeat(41)).await, Err(EngineError::Validation(_))));
    assert_eq!(submit(&state, "ghost", "c1", "flag{c1}").await.unwrap_err(), EngineError::user_not_found("ghost"));
    assert_eq!(submit(&state, "u1", "nope", "flag{c1}").await.unwrap_err(), EngineError::challenge_not_found("nope"));
    // Hidden challenges do not accept submissions.
    assert_eq!(
      submit(&state, "u1", "secret", "flag{hidden}").await.unwrap_err(),
      EngineError::challenge_not_found("secret")
    );

    assert_eq!(state.ledger.snapshot().await.len(), 0);
  }

  struct StaleOracle;

  impl VerificationOracle for StaleOracle {
    fn verify(&self, _challenge_id: &str, _submitted: &str) -> Verdict {
      Verdict::correct(Some("flag9".into()))
    }
  }

  #[tokio::test]
  async fn undeclared_part_from_the_oracle_is_rejected() {
    let clock = Arc::new(ManualClock::new(0));
    let state = AppState::from_config(parse_config(TEST_CONFIG).unwrap(), clock)
      .await
      .with_oracle(Arc::new(StaleOracle));

    let err = submit(&state, "u1", "c2", "flag9{x}").await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(ref m) if m.contains("flag9")));
    assert_eq!(state.ledger.snapshot().await.len(), 0);

    // Single-part challenges ignore the stray part key.
    let ok = submit(&state, "u1", "c1", "anything").await.unwrap();
    assert!(ok.newly_solved);
    assert_eq!(ok.part_key, None);
  }

  #[tokio::test]
  async fn progress_reports_breakdowns_and_hidden_scope() {
    let (state, _) = test_state().await;
    submit(&state, "u1", "c1", "flag{c1}").await.unwrap();

    let p = get_progress(&state, "u1", Scope::ActiveOnly).await.unwrap();
    assert_eq!(p.total_count, 3);
    assert_eq!(p.solved_count, 1);
    assert_eq!(p.completion_percentage, 33);
    assert_eq!(p.by_category["Cryptography"].percentage, 50);
    assert_eq!(p.by_category["Web"].percentage, 0);
    assert!(!p.by_category.contains_key("Misc"));
    assert_eq!(p.total_score, 100);

    let admin = get_progress(&state, "u1", Scope::IncludeHidden).await.unwrap();
    assert_eq!(admin.total_count, 4);
    assert_eq!(admin.by_category["Misc"].total, 1);

    assert!(matches!(get_progress(&state, "ghost", Scope::ActiveOnly).await, Err(EngineError::NotFound { .. })));
  }

  #[tokio::test]
  async fn leaderboard_ties_and_limit() {
    let (state, clock) = test_state().await;
    clock.set(100);
    submit(&state, "u2", "c1", "flag{c1}").await.unwrap();
    clock.set(200);
    submit(&state, "u1", "c1", "flag{c1}").await.unwrap();
    clock.set(300);
    submit(&state, "u3", "c3", "flag{c3}").await.unwrap();

    let board = get_leaderboard(&state, None, None).await;
    let rows: Vec<_> = board.iter().map(|e| (e.rank, e.user_id.as_str(), e.total_score)).collect();
    assert_eq!(rows, vec![(1, "u2", 100), (1, "u1", 100), (3, "u3", 80)]);
    assert_eq!(board[0].score_reached_at, Some(100));

    assert_eq!(get_leaderboard(&state, Some(2), None).await.len(), 2);
  }

  #[tokio::test]
  async fn user_rank_matches_the_board_including_ties() {
    let (state, clock) = test_state().await;
    clock.set(100);
    submit(&state, "u2", "c1", "flag{c1}").await.unwrap();
    clock.set(200);
    submit(&state, "u1", "c1", "flag{c1}").await.unwrap();
    clock.set(300);
    submit(&state, "u3", "c3", "flag{c3}").await.unwrap();

    // u1 sits second on the board but shares rank 1 with u2.
    let u1 = get_user_rank(&state, "u1").await.unwrap();
    assert_eq!((u1.rank, u1.total_score), (1, 100));
    assert_eq!(get_user_rank(&state, "u3").await.unwrap().rank, 3);

    assert_eq!(get_progress(&state, "u1", Scope::ActiveOnly).await.unwrap().rank, Some(1));
    assert_eq!(get_progress(&state, "u2", Scope::IncludeHidden).await.unwrap().rank, Some(1));
    assert_eq!(get_progress(&state, "u3", Scope::ActiveOnly).await.unwrap().rank, Some(3));

    // The rank ignores the board limit.
    assert_eq!(get_leaderboard(&state, Some(1), None).await.len(), 1);
    assert_eq!(get_user_rank(&state, "u3").await.unwrap().rank, 3);

    assert_eq!(get_user_rank(&state, "ghost").await.unwrap_err(), EngineError::user_not_found("ghost"));
  }

  #[tokio::test]
  async fn category_board_ranks_only_points_from_that_category() {
    let (state, clock) = test_state().await;
    submit(&state, "u1", "c1", "flag{c1}").await.unwrap();
    clock.advance(10);
    submit(&state, "u2", "c2", "flag1{forwarded}").await.unwrap();
    submit(&state, "u2", "c2", "flag2{proxied}").await.unwrap();

    let overall = get_leaderboard(&state, None, None).await;
    assert_eq!((overall[0].user_id.as_str(), overall[0].total_score), ("u2", 150));

    let crypto = get_leaderboard(&state, None, Some("Cryptography")).await;
    assert_eq!((crypto[0].user_id.as_str(), crypto[0].total_score), ("u1", 100));
    let u2 = crypto.iter().find(|e| e.user_id == "u2").unwrap();
    assert_eq!((u2.rank, u2.total_score), (2, 0));

    let web = get_leaderboard(&state, None, Some("Web")).await;
    assert_eq!((web[0].user_id.as_str(), web[0].total_score), ("u2", 150));

    // Hidden challenges stay out of category boards too.
    assert!(get_leaderboard(&state, None, Some("Misc")).await.iter().all(|e| e.total_score == 0));
    assert!(get_leaderboard(&state, None, Some("Nope")).await.iter().all(|e| e.rank == 1));

    // Memoized boards do not leak across filters.
    assert_eq!(get_leaderboard(&state, None, None).await, overall);
    assert_eq!(get_leaderboard(&state, None, Some("Cryptography")).await, crypto);
  }

  #[tokio::test]
  async fn parts_without_part_flags_are_solvable_as_single_part() {
    let cfg = parse_config(
      r#"
      [engine]
      seed_sample_data = false

      [[challenges]]
      id = "m"
      title = "Mismatch"
      points = 40
      difficulty = "Medium"
      category = "Web"
      flag = "flag{right}"
      parts = { a = "a{...}", b = "b{...}" }

      [[users]]
      id = "u1"
      username = "alice"
      "#,
    )
    .unwrap();
    let state = AppState::from_config(cfg, Arc::new(ManualClock::new(0))).await;

    let out = submit(&state, "u1", "m", "flag{right}").await.unwrap();
    assert!(out.correct && out.newly_solved);
    assert_eq!(out.part_key, None);
    assert_eq!(out.total_score, 40);

    let p = get_progress(&state, "u1", Scope::ActiveOnly).await.unwrap();
    assert_eq!(p.misconfigured, vec!["m".to_string()]);
  }

  #[tokio::test]
  async fn own_submission_is_visible_on_the_next_read() {
    let (state, _) = test_state().await;
    let before = get_leaderboard(&state, None, None).await;
    assert!(before.iter().all(|e| e.total_score == 0));

    submit(&state, "u3", "c1", "flag{c1}").await.unwrap();
    let after = get_leaderboard(&state, None, None).await;
    assert_eq!(after[0].user_id, "u3");
    assert_eq!(after[0].total_score, 100);
    assert_eq!(get_progress(&state, "u3", Scope::ActiveOnly).await.unwrap().total_score, 100);
  }

  #[tokio::test]
  async fn concurrent_submissions_for_one_pair_credit_once() {
    let (state, _) = test_state().await;
    let mut handles = Vec::new();
    for _ in 0..16 {
      let s = Arc::clone(&state);
      handles.push(tokio::spawn(async move { submit(&s, "u1", "c1", "flag{c1}").await.unwrap() }));
    }
    let mut newly = 0;
    let mut delta = 0;
    for h in handles {
      let out = h.await.unwrap();
      if out.newly_solved {
        newly += 1;
      }
      delta += out.score_delta;
    }
    assert_eq!(newly, 1);
    assert_eq!(delta, 100);
    assert_eq!(state.ledger.snapshot().await.len(), 16);
  }

  #[tokio::test]
  async fn stats_count_distinct_solvers() {
    let (state, _) = test_state().await;
    submit(&state, "u1", "c1", "flag{c1}").await.unwrap();
    submit(&state, "u1", "c1", "flag{c1}").await.unwrap();
    submit(&state, "u2", "c1", "wrong").await.unwrap();
    submit(&state, "u2", "c2", "flag1{forwarded}").await.unwrap();

    let stats = get_stats(&state, Scope::ActiveOnly).await;
    assert_eq!(stats.total_users, 3);
    assert_eq!(stats.total_challenges, 3);
    assert_eq!(stats.total_submissions, 4);
    assert_eq!(stats.total_correct_submissions, 3);
    let c1 = stats.challenges.iter().find(|c| c.challenge_id == "c1").unwrap();
    assert_eq!((c1.attempts, c1.correct_attempts, c1.solves), (3, 2, 1));
    let c2 = stats.challenges.iter().find(|c| c.challenge_id == "c2").unwrap();
    assert_eq!(c2.solves, 0);
  }

  #[tokio::test]
  async fn register_then_list() {
    let (state, _) = test_state().await;
    let dave = register_user(&state, " dave ").await.unwrap();
    assert_eq!(dave.username, "dave");
    assert!(matches!(register_user(&state, "alice").await, Err(EngineError::Validation(_))));

    let visible = list_challenges(&state, Scope::ActiveOnly).await;
    assert_eq!(visible.len(), 3);
    let c2 = visible.iter().find(|c| c.id == "c2").unwrap();
    assert_eq!(c2.parts.as_ref().map(|p| p.len()), Some(2));
    assert_eq!(list_challenges(&state, Scope::IncludeHidden).await.len(), 4);
  }
}
