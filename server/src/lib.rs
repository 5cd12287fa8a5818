//! Top-N leaderboard service.
//!
//! Submissions go through [`submission::SubmissionService`], reads through
//! [`query::QueryService`]; both sit on the SQLite store in [`store`] and the
//! ranking queries in [`ranking`]. [`service`] exposes them over HTTP.

pub mod config;
pub mod error;
pub mod query;
pub mod ranking;
pub mod service;
pub mod store;
pub mod submission;


pub use error::{LeaderboardError, LeaderboardResult};
