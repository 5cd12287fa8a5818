//! `GET /games` and `GET /health`

use axum::extract::State;
use axum::Json;
use leaderboard::Game;

use crate::error::LeaderboardError;
use crate::service::AppState;

pub async fn list_games() -> Json<Vec<&'static str>> {
    Json(Game::ALL.iter().map(|g| g.as_str()).collect())
}

/// Healthy when a pooled connection answers a trivial query.
pub async fn health(State(state): State<AppState>) -> Result<&'static str, LeaderboardError> {
    state.db.ping().await?;
    Ok("OK")
}
