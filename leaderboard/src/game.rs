//! The fixed catalogue of games that own a leaderboard.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A game with its own leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Game {
    #[serde(rename = "game1")]
    Game1,
    #[serde(rename = "game2")]
    Game2,
    #[serde(rename = "game3-1")]
    Game3Level1,
    #[serde(rename = "game3-2")]
    Game3Level2,
    #[serde(rename = "game3-3")]
    Game3Level3,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown game: {0}")]
pub struct GameParseError(pub String);

impl Game {
    pub const ALL: [Game; 5] = [
        Game::Game1,
        Game::Game2,
        Game::Game3Level1,
        Game::Game3Level2,
        Game::Game3Level3,
    ];

    /// Canonical identifier, as stored and returned to clients.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Game1 => "game1",
            Self::Game2 => "game2",
            Self::Game3Level1 => "game3-1",
            Self::Game3Level2 => "game3-2",
            Self::Game3Level3 => "game3-3",
        }
    }

    /// Resolve a client-supplied identifier.
    ///
    /// Matching is case-insensitive and accepts both the canonical ids and
    /// the legacy `gm3-levelN` names the level-select screens still send.
    pub fn parse(s: &str) -> Result<Self, GameParseError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "game1" => Ok(Self::Game1),
            "game2" => Ok(Self::Game2),
            "game3-1" | "gm3-level1" => Ok(Self::Game3Level1),
            "game3-2" | "gm3-level2" => Ok(Self::Game3Level2),
            "game3-3" | "gm3-level3" => Ok(Self::Game3Level3),
            _ => Err(GameParseError(s.to_string())),
        }
    }
}

impl FromStr for Game {
    type Err = GameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
