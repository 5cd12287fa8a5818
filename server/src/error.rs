//! Error taxonomy shared by the services and the HTTP layer.

use leaderboard::{GameParseError, UsernameError};

/// Errors surfaced by leaderboard operations.
#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    /// Bad game id on a write or preview, malformed username, negative score,
    /// out-of-range limit. Never retried.
    #[error("{0}")]
    InvalidInput(String),
    /// Unknown game on the read path.
    #[error("{0}")]
    NotFound(String),
    /// Pool exhausted or closed, or the connection itself failed.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] sqlx::Error),
    /// A submission failed part-way and was rolled back.
    #[error("Submission failed and was rolled back: {0}")]
    TransactionFailure(#[source] sqlx::Error),
    /// A read query failed for a reason other than availability.
    #[error("Query failed: {0}")]
    QueryFailure(#[source] sqlx::Error),
    #[error("Migration failed: {0}")]
    Migration(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LeaderboardResult<T> = Result<T, LeaderboardError>;

impl LeaderboardError {
    /// Classify a failure inside the submission transaction.
    pub(crate) fn transaction(err: sqlx::Error) -> Self {
        if is_unavailable(&err) {
            Self::StorageUnavailable(err)
        } else {
            Self::TransactionFailure(err)
        }
    }

    /// Classify a failure on the read path.
    pub(crate) fn query(err: sqlx::Error) -> Self {
        if is_unavailable(&err) {
            Self::StorageUnavailable(err)
        } else {
            Self::QueryFailure(err)
        }
    }

    pub(crate) fn unknown_game(err: GameParseError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<UsernameError> for LeaderboardError {
    fn from(err: UsernameError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// SQLite primary result codes for a lock held past `busy_timeout`.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

fn is_unavailable(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db) => db
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            // Extended codes keep the primary code in the low byte.
            .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED)),
        _ => false,
    }
}
