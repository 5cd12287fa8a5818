//! Configuration for the leaderboard server.
//!
//! Every setting has a command-line flag and an environment variable. The
//! database path defaults with the following precedence:
//! 1. `--database` / `LEADERBOARD_DATABASE`
//! 2. `$HOME/.local/share/leaderboard/scores.db`
//! 3. `./data/scores.db` (fallback for development)

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::store::DatabaseConfig;

const DEFAULT_DATA_DIR: &str = ".local/share/leaderboard";
const DEV_DATA_DIR: &str = "./data";
const DATABASE_FILE: &str = "scores.db";

#[derive(Debug, Clone, Parser)]
#[command(name = "leaderboard-server", about = "Top-N arcade leaderboard HTTP service")]
pub struct ServerArgs {
    /// SQLite database file. Created on first start.
    #[arg(long, env = "LEADERBOARD_DATABASE")]
    pub database: Option<PathBuf>,

    /// Address the HTTP listener binds to.
    #[arg(long, env = "LEADERBOARD_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Pooled database connections shared by all requests.
    #[arg(long, env = "LEADERBOARD_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,

    /// How long a request waits for a pooled connection before failing.
    #[arg(long, env = "LEADERBOARD_ACQUIRE_TIMEOUT_MS", default_value_t = 5_000)]
    pub acquire_timeout_ms: u64,

    /// How long a write waits on SQLite's lock before failing.
    #[arg(long, env = "LEADERBOARD_BUSY_TIMEOUT_MS", default_value_t = 5_000)]
    pub busy_timeout_ms: u64,
}

impl ServerArgs {
    pub fn database_config(&self) -> DatabaseConfig {
        let path = self.database.clone().unwrap_or_else(default_database_path);
        DatabaseConfig {
            path,
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_millis(self.acquire_timeout_ms),
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }
}

/// Get the default database path when none is configured.
pub fn default_database_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(DEFAULT_DATA_DIR).join(DATABASE_FILE);
    }

    PathBuf::from(DEV_DATA_DIR).join(DATABASE_FILE)
}
