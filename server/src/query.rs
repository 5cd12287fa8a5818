//! Read-only leaderboard views.

use leaderboard::{Game, Username, TOP_N};
use serde::Serialize;

use crate::error::{LeaderboardError, LeaderboardResult};
use crate::ranking::{self, LeaderboardRow};
use crate::store::Database;

/// Response body of a rank preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewReport {
    pub preview_rank: u64,
    pub qualifies: bool,
    pub current_rows: u64,
    pub top_n: u32,
    pub game: Game,
    pub score: i64,
}

/// Listing and preview queries. Runs without explicit transactions and
/// never writes.
#[derive(Debug, Clone)]
pub struct QueryService {
    db: Database,
    top_n: u32,
}

impl QueryService {
    pub fn new(db: Database) -> Self {
        Self::with_top_n(db, TOP_N)
    }

    pub fn with_top_n(db: Database, top_n: u32) -> Self {
        Self { db, top_n }
    }

    pub fn top_n(&self) -> u32 {
        self.top_n
    }

    /// The top `limit` records of `game`, with `1 <= limit <= N`.
    pub async fn leaderboard(&self, game: Game, limit: i64) -> LeaderboardResult<Vec<LeaderboardRow>> {
        let limit = self.bounded("limit", limit)?;
        tracing::debug!(game = %game, limit, "Listing leaderboard");
        ranking::listing(self.db.pool(), game, limit)
            .await
            .map_err(LeaderboardError::query)
    }

    /// Where `score` would land among `n` places on `game`'s board.
    ///
    /// With `player` set, that player's stored record is left out of the
    /// counts, so a returning player is not ranked against their own best.
    pub async fn preview(
        &self,
        game: Game,
        score: i64,
        n: i64,
        player: Option<&Username>,
    ) -> LeaderboardResult<PreviewReport> {
        if score < 0 {
            return Err(LeaderboardError::InvalidInput("Score must be >= 0".to_string()));
        }
        let n = self.bounded("n", n)?;

        let preview = ranking::preview_rank(self.db.pool(), game, score, n, player)
            .await
            .map_err(LeaderboardError::query)?;
        tracing::debug!(
            game = %game,
            score,
            n,
            rank = preview.rank,
            qualifies = preview.qualifies,
            "Previewed rank"
        );

        Ok(PreviewReport {
            preview_rank: preview.rank,
            qualifies: preview.qualifies,
            current_rows: preview.current_rows,
            top_n: n,
            game,
            score,
        })
    }

    fn bounded(&self, field: &str, value: i64) -> LeaderboardResult<u32> {
        match u32::try_from(value) {
            Ok(v) if (1..=self.top_n).contains(&v) => Ok(v),
            _ => Err(LeaderboardError::InvalidInput(format!(
                "{field} must be between 1 and {}",
                self.top_n
            ))),
        }
    }
}
