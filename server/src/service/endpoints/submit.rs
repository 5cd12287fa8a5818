//! `POST /submit`

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::error::LeaderboardError;
use crate::service::AppState;
use crate::submission::{Submission, SubmitOutcome};

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub game: String,
    pub username: String,
    pub score: i64,
}

pub async fn submit_score(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SubmitOutcome>, LeaderboardError> {
    let Json(req) = payload?;
    tracing::info!(game = %req.game, username = %req.username, score = req.score, "POST submit");
    let submission = Submission::parse(&req.game, &req.username, req.score)?;
    let outcome = state.submissions.submit(&submission).await?;
    Ok(Json(outcome))
}
