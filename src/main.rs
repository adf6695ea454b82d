//! CTF Scoreboard · Progress & Score Derivation Backend
//!
//! - Axum HTTP + WebSocket API
//! - Append-only submission ledger; scores, progress and ranks are derived on read
//! - Optional TOML config for challenges, flags and users (built-in samples otherwise)
//!
//! Important env variables:
//!   PORT            : u16 (default 3000)
//!   CTF_CONFIG_PATH : path to TOML config ([engine], [[challenges]], [[users]])
//!   LOG_LEVEL       : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT      : "pretty" (default) or "json"

mod telemetry;
mod util;
mod clock;
mod domain;
mod error;
mod config;
mod seeds;
mod catalog;
mod ledger;
mod progress;
mod score;
mod leaderboard;
mod users;
mod oracle;
mod locks;
mod state;
mod protocol;
mod logic;
mod admin;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (catalog, ledger, users, flag book).
  let state = Arc::new(AppState::from_env().await);

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "ctf_scoreboard", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "ctf_scoreboard", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "ctf_scoreboard", error = %e, "Failed to listen for shutdown signal");
  }
}
