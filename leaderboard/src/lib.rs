//! Domain rules for per-game Top-N arcade leaderboards.
//!
//! This crate holds everything about a leaderboard that does not touch a
//! database: which games exist, what a valid player name is, and the
//! canonical ranking order together with an in-memory model of a board.

pub mod game;
pub mod player;
pub mod ranking;

pub use game::{Game, GameParseError};
pub use player::{Username, UsernameError};
pub use ranking::{Preview, PreviewCounts, RankKey, ScoreRecord, Standings, TOP_N};
