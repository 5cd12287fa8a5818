//! Canonical ranking order and an in-memory model of a Top-N board.
//!
//! Every ranked view of a board (a player's rank, the cutoff score at
//! position N, the set of records that survive pruning) is derived from the
//! same total order, [`RankKey`]:
//!
//! 1. higher `score` first,
//! 2. then earlier `created_at` (the player who reached the score first),
//! 3. then `username` ascending.
//!
//! Because a board holds at most one record per player the key is unique
//! within a board, so ranks are always `1..=len` with no shared positions.
//!
//! [`Standings`] applies these rules to a plain vector. The server keeps the
//! real board in the database; the model here is what its queries are
//! checked against.

use std::cmp::Ordering;

use crate::{Game, Username};

/// Number of records retained per game.
pub const TOP_N: u32 = 100;

/// One player's best score on one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub id: String,
    pub game: Game,
    pub username: Username,
    pub score: i64,
    /// Stamp of the submission that set the current `score`.
    pub created_at: i64,
}

impl ScoreRecord {
    pub fn rank_key(&self) -> RankKey {
        RankKey {
            score: self.score,
            created_at: self.created_at,
            username: self.username.clone(),
        }
    }
}

/// Sort key implementing the canonical order. `a < b` means `a` ranks above `b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankKey {
    pub score: i64,
    pub created_at: i64,
    pub username: Username,
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.created_at.cmp(&other.created_at))
            .then_with(|| self.username.cmp(&other.username))
    }
}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Row counts a preview is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewCounts {
    /// Records with a strictly higher score than the candidate.
    pub greater: u64,
    /// Records with exactly the candidate score.
    pub equal: u64,
    /// All records considered.
    pub total: u64,
}

/// Where a hypothetical score would land, without storing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preview {
    pub rank: u64,
    pub qualifies: bool,
    pub current_rows: u64,
}

impl Preview {
    /// A new record is the newest one on the board, so it loses every
    /// tie on score and lands after all equal scores.
    pub fn from_counts(counts: PreviewCounts, top_n: u32) -> Self {
        let rank = 1 + counts.greater + counts.equal;
        let top_n = u64::from(top_n);
        Self {
            rank,
            qualifies: counts.total < top_n || rank <= top_n,
            current_rows: counts.total,
        }
    }
}

/// A board held in memory, always kept in canonical order.
#[derive(Debug, Clone, Default)]
pub struct Standings {
    records: Vec<ScoreRecord>,
}

impl Standings {
    pub fn new(mut records: Vec<ScoreRecord>) -> Self {
        records.sort_by_cached_key(ScoreRecord::rank_key);
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in rank order.
    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn find(&self, username: &Username) -> Option<&ScoreRecord> {
        self.records.iter().find(|r| &r.username == username)
    }

    /// 1-based rank of the record with `id`, or `None` if it is not on the board.
    pub fn rank_of(&self, id: &str) -> Option<u32> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .map(|pos| pos as u32 + 1)
    }

    /// Score at position `n`, or `None` while the board holds fewer than `n` records.
    pub fn cutoff_score(&self, n: u32) -> Option<i64> {
        let idx = (n as usize).checked_sub(1)?;
        self.records.get(idx).map(|r| r.score)
    }

    /// Drop every record past position `n` and return them.
    pub fn prune(&mut self, n: u32) -> Vec<ScoreRecord> {
        let keep = (n as usize).min(self.records.len());
        self.records.split_off(keep)
    }

    /// Preview `score` against the board, optionally ignoring one player's
    /// own record.
    pub fn preview(&self, score: i64, n: u32, exclude: Option<&Username>) -> Preview {
        let counts = self
            .records
            .iter()
            .filter(|r| Some(&r.username) != exclude)
            .fold(PreviewCounts::default(), |mut acc, r| {
                acc.total += 1;
                match r.score.cmp(&score) {
                    Ordering::Greater => acc.greater += 1,
                    Ordering::Equal => acc.equal += 1,
                    Ordering::Less => {}
                }
                acc
            });
        Preview::from_counts(counts, n)
    }

    /// Best-score upsert: insert a new record, or raise an existing one.
    ///
    /// `created_at` moves to `stamp` only when `score` strictly beats the
    /// stored score. `new_id` is used only when a record is created.
    /// Returns the stored record.
    pub fn upsert(
        &mut self,
        game: Game,
        username: &Username,
        score: i64,
        stamp: i64,
        new_id: impl FnOnce() -> String,
    ) -> ScoreRecord {
        let stored = match self.records.iter_mut().find(|r| &r.username == username) {
            Some(existing) => {
                if score > existing.score {
                    existing.score = score;
                    existing.created_at = stamp;
                }
                existing.clone()
            }
            None => {
                let record = ScoreRecord {
                    id: new_id(),
                    game,
                    username: username.clone(),
                    score,
                    created_at: stamp,
                };
                self.records.push(record.clone());
                record
            }
        };
        self.records.sort_by_cached_key(ScoreRecord::rank_key);
        stored
    }
}
