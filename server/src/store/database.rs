//! SQLite database connection pool and migration runner.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{LeaderboardError, LeaderboardResult};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool and file settings for [`Database::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    /// Upper bound on pooled connections; requests beyond it wait for
    /// `acquire_timeout` and then fail as unavailable.
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// How long a connection waits on SQLite's write lock before giving up.
    pub busy_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

/// Holds a connection pool to the SQLite database.
///
/// Opened once at startup, cloned into every request handler, closed on
/// shutdown.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database described by `config`, run migrations,
    /// and return a ready-to-use `Database`.
    pub async fn open(config: &DatabaseConfig) -> LeaderboardResult<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", config.path.display()))
            .map_err(LeaderboardError::StorageUnavailable)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(LeaderboardError::StorageUnavailable)?;

        let db = Self { pool };
        db.run_migrations().await?;
        tracing::info!(
            path = %config.path.display(),
            max_connections = config.max_connections,
            "Score database ready"
        );
        Ok(db)
    }

    /// Create an in-memory database for testing. Migrations are applied.
    #[cfg(test)]
    pub async fn new_in_memory() -> LeaderboardResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(LeaderboardError::StorageUnavailable)?
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(LeaderboardError::StorageUnavailable)?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run embedded migrations from `server/migrations/`.
    async fn run_migrations(&self) -> LeaderboardResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| LeaderboardError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trip a trivial query through a pooled connection.
    pub async fn ping(&self) -> LeaderboardResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(LeaderboardError::query)?;
        Ok(())
    }

    /// Close every pooled connection. Pending acquires fail with `PoolClosed`.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
