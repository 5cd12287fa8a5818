//! `GET /leaderboard/{game}`

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use leaderboard::Game;
use serde::Deserialize;

use crate::error::LeaderboardError;
use crate::ranking::LeaderboardRow;
use crate::service::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    /// Rows to return, `1..=N`. Defaults to N.
    pub limit: Option<i64>,
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    game: Result<Path<String>, PathRejection>,
    params: Result<Query<LeaderboardParams>, QueryRejection>,
) -> Result<Json<Vec<LeaderboardRow>>, LeaderboardError> {
    let Path(game) = game?;
    let Query(params) = params?;
    tracing::debug!(game = %game, limit = ?params.limit, "GET leaderboard");
    let game = Game::parse(&game).map_err(|e| LeaderboardError::NotFound(e.to_string()))?;
    let limit = params.limit.unwrap_or(i64::from(state.queries.top_n()));
    let rows = state.queries.leaderboard(game, limit).await?;
    Ok(Json(rows))
}
