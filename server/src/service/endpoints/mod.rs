//! Endpoint handlers organized by domain

pub mod leaderboard;
pub mod meta;
pub mod preview;
pub mod submit;
