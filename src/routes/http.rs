//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; flag text is never logged, only its length.

use std::sync::Arc;
use axum::{extract::{Path, Query, State}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::admin::{self, AdminReport};
use crate::domain::{Scope, Submission};
use crate::error::EngineError;
use crate::leaderboard::LeaderboardEntry;
use crate::logic::*;
use crate::protocol::*;
use crate::score::ProgressReport;
use crate::state::AppState;
use crate::users::UserRecord;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state, body), fields(username = %body.username))]
pub async fn http_register_user(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RegisterIn>,
) -> Result<Json<UserRecord>, EngineError> {
  let user = register_user(&state, &body.username).await?;
  Ok(Json(user))
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_challenges(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ScopeQuery>,
) -> impl IntoResponse {
  Json(list_challenges(&state, Scope::from_include_hidden(q.include_hidden)).await)
}

#[instrument(level = "info", skip(state, body), fields(%challenge_id, user_id = %body.user_id, flag_len = body.flag.len()))]
pub async fn http_submit_flag(
  State(state): State<Arc<AppState>>,
  Path(challenge_id): Path<String>,
  Json(body): Json<SubmitIn>,
) -> Result<Json<SubmitOut>, EngineError> {
  let out = submit(&state, &body.user_id, &challenge_id, &body.flag).await?;
  info!(target: "submission", %challenge_id, correct = out.correct, newly_solved = out.newly_solved, "HTTP submit evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state), fields(%challenge_id, user_id = %q.user_id))]
pub async fn http_get_history(
  State(state): State<Arc<AppState>>,
  Path(challenge_id): Path<String>,
  Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<Submission>>, EngineError> {
  Ok(Json(get_history(&state, &q.user_id, &challenge_id).await?))
}

#[instrument(level = "info", skip(state), fields(%user_id))]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  Query(q): Query<ScopeQuery>,
) -> Result<Json<ProgressReport>, EngineError> {
  Ok(Json(get_progress(&state, &user_id, Scope::from_include_hidden(q.include_hidden)).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_leaderboard(
  State(state): State<Arc<AppState>>,
  Query(q): Query<LeaderboardQuery>,
) -> impl IntoResponse {
  Json(get_leaderboard(&state, q.limit, q.category.as_deref()).await)
}

#[instrument(level = "info", skip(state), fields(%user_id))]
pub async fn http_get_user_rank(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
) -> Result<Json<LeaderboardEntry>, EngineError> {
  Ok(Json(get_user_rank(&state, &user_id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_stats(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ScopeQuery>,
) -> impl IntoResponse {
  Json(get_stats(&state, Scope::from_include_hidden(q.include_hidden)).await)
}

#[instrument(level = "info", skip(state), fields(%user_id))]
pub async fn http_admin_reset_user(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
) -> Result<Json<AdminReport>, EngineError> {
  Ok(Json(admin::reset_user(&state, &user_id).await?))
}

/// Body is optional; `{"userId": ...}` narrows the reset to one user.
#[instrument(level = "info", skip(state, body), fields(%challenge_id))]
pub async fn http_admin_reset_challenge(
  State(state): State<Arc<AppState>>,
  Path(challenge_id): Path<String>,
  body: Option<Json<ResetChallengeIn>>,
) -> Result<Json<AdminReport>, EngineError> {
  let report = match body.and_then(|Json(b)| b.user_id) {
    Some(user_id) => admin::reset_user_challenge(&state, &user_id, &challenge_id).await?,
    None => admin::reset_challenge(&state, &challenge_id).await?,
  };
  Ok(Json(report))
}

#[instrument(level = "info", skip(state), fields(%challenge_id))]
pub async fn http_admin_toggle_visibility(
  State(state): State<Arc<AppState>>,
  Path(challenge_id): Path<String>,
) -> Result<Json<AdminReport>, EngineError> {
  Ok(Json(admin::toggle_visibility(&state, &challenge_id).await?))
}

#[instrument(level = "info", skip(state), fields(%challenge_id))]
pub async fn http_admin_delete_challenge(
  State(state): State<Arc<AppState>>,
  Path(challenge_id): Path<String>,
) -> Result<Json<AdminReport>, EngineError> {
  Ok(Json(admin::delete_challenge(&state, &challenge_id).await?))
}
