//! `GET /preview`

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use leaderboard::{Game, Username};
use serde::Deserialize;

use crate::error::LeaderboardError;
use crate::query::PreviewReport;
use crate::service::AppState;

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    pub game: String,
    pub score: i64,
    /// Board size to preview against. Defaults to N.
    pub n: Option<i64>,
    /// When set, this player's stored record is ignored.
    pub username: Option<String>,
}

pub async fn preview_rank(
    State(state): State<AppState>,
    params: Result<Query<PreviewParams>, QueryRejection>,
) -> Result<Json<PreviewReport>, LeaderboardError> {
    let Query(params) = params?;
    tracing::debug!(game = %params.game, score = params.score, n = ?params.n, "GET preview");
    let game = Game::parse(&params.game).map_err(LeaderboardError::unknown_game)?;
    let player = params
        .username
        .as_deref()
        .map(Username::parse)
        .transpose()?;
    let n = params.n.unwrap_or(i64::from(state.queries.top_n()));

    let report = state
        .queries
        .preview(game, params.score, n, player.as_ref())
        .await?;
    Ok(Json(report))
}
