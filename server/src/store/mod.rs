//! Durable storage for per-game best scores.
//!
//! [`Database`] wraps a `sqlx::SqlitePool` configured with WAL journaling
//! (one writer, concurrent readers) and a busy timeout, and runs the embedded
//! migrations in `server/migrations/` on open.
//!
//! [`scores`] holds the two write primitives of a submission: claiming a
//! game's board row and the conditional best-score upsert.

mod database;
pub mod scores;

pub use database::{Database, DatabaseConfig};
pub use scores::StoredScore;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in microseconds since the unix epoch.
pub fn now_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as i64
}
