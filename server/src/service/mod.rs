//! HTTP service exposing submissions and leaderboard queries.
//!
//! This module wires the handlers into an axum [`Router`]:
//! - endpoints: one handler module per route group
//! - error: [`LeaderboardError`](crate::error::LeaderboardError) → status code + JSON body
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /leaderboard/{game}?limit=` | [`endpoints::leaderboard::get_leaderboard`] |
//! | `POST /submit` | [`endpoints::submit::submit_score`] |
//! | `GET /preview?game=&score=&n=&username=` | [`endpoints::preview::preview_rank`] |
//! | `GET /games` | [`endpoints::meta::list_games`] |
//! | `GET /health` | [`endpoints::meta::health`] |

pub mod endpoints;
mod error;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::query::QueryService;
use crate::store::Database;
use crate::submission::SubmissionService;

/// Shared handler state. Cloning is cheap: every field wraps the same pool.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub submissions: SubmissionService,
    pub queries: QueryService,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            submissions: SubmissionService::new(db.clone()),
            queries: QueryService::new(db.clone()),
            db,
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/leaderboard/:game", get(endpoints::leaderboard::get_leaderboard))
        .route("/submit", post(endpoints::submit::submit_score))
        .route("/preview", get(endpoints::preview::preview_rank))
        .route("/games", get(endpoints::meta::list_games))
        .route("/health", get(endpoints::meta::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
