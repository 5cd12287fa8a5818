//! Atomic score submission: claim, upsert, prune, re-rank.

use leaderboard::{Game, Username, TOP_N};
use serde::Serialize;

use crate::error::{LeaderboardError, LeaderboardResult};
use crate::ranking;
use crate::store::{now_micros, scores, Database};

/// A validated score submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub game: Game,
    pub username: Username,
    pub score: i64,
}

impl Submission {
    /// Validate raw client input. Every failure is [`LeaderboardError::InvalidInput`].
    pub fn parse(game: &str, username: &str, score: i64) -> LeaderboardResult<Self> {
        let game = Game::parse(game).map_err(LeaderboardError::unknown_game)?;
        let username = Username::parse(username)?;
        if score < 0 {
            return Err(LeaderboardError::InvalidInput("Score must be >= 0".to_string()));
        }
        Ok(Self {
            game,
            username,
            score,
        })
    }
}

/// What a submission left on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    /// The player's record is within the top N after pruning.
    pub accepted: bool,
    pub rank: Option<i64>,
    /// Stored best score, which may be higher than the one just submitted.
    pub score: i64,
    pub username: Username,
    pub game: Game,
}

/// Applies submissions, one transaction each.
#[derive(Debug, Clone)]
pub struct SubmissionService {
    db: Database,
    top_n: u32,
}

impl SubmissionService {
    pub fn new(db: Database) -> Self {
        Self::with_top_n(db, TOP_N)
    }

    pub fn with_top_n(db: Database, top_n: u32) -> Self {
        Self { db, top_n }
    }

    /// Apply `submission` and report where it landed.
    ///
    /// Claim the board, read the cutoff, upsert the best score, prune past
    /// N and rank the record, all in one transaction. A record that was
    /// inserted and pruned in the same pass comes back with
    /// `accepted == false`. Any error drops the transaction, which rolls it
    /// back, so a failed submission leaves nothing behind.
    pub async fn submit(&self, submission: &Submission) -> LeaderboardResult<SubmitOutcome> {
        let Submission {
            game,
            username,
            score,
        } = submission;

        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(LeaderboardError::transaction)?;

        let stamp = scores::claim_board(&mut *tx, *game, now_micros())
            .await
            .map_err(LeaderboardError::transaction)?;

        let cutoff = ranking::cutoff_score(&mut *tx, *game, self.top_n)
            .await
            .map_err(LeaderboardError::transaction)?;

        let stored = scores::upsert_best(&mut *tx, *game, username, *score, stamp)
            .await
            .map_err(LeaderboardError::transaction)?;

        let pruned = ranking::prune(&mut *tx, *game, self.top_n)
            .await
            .map_err(LeaderboardError::transaction)?;

        let rank = ranking::rank_of(&mut *tx, *game, &stored.id)
            .await
            .map_err(LeaderboardError::transaction)?;

        tx.commit().await.map_err(LeaderboardError::transaction)?;

        tracing::info!(
            game = %game,
            username = %username,
            submitted = score,
            stored = stored.score,
            ?cutoff,
            ?rank,
            pruned,
            "Score submitted"
        );

        Ok(SubmitOutcome {
            accepted: rank.is_some(),
            rank,
            score: stored.score,
            username: username.clone(),
            game: *game,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::scores::load_board;

    fn sub(game: Game, user: &str, score: i64) -> Submission {
        Submission {
            game,
            username: Username::parse(user).unwrap(),
            score,
        }
    }

    #[test]
    fn test_parse_normalizes_input() {
        let s = Submission::parse("GM3-LEVEL1", "abc", 7).unwrap();
        assert_eq!(s.game, Game::Game3Level1);
        assert_eq!(s.username.as_str(), "ABC");
        assert_eq!(s.score, 7);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            Submission::parse("nope", "ABC", 1),
            Err(LeaderboardError::InvalidInput(_))
        ));
        assert!(matches!(
            Submission::parse("game1", "AB", 1),
            Err(LeaderboardError::InvalidInput(_))
        ));
        assert!(matches!(
            Submission::parse("game1", "ABC", -1),
            Err(LeaderboardError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_first_submission_ranks_first() {
        let db = Database::new_in_memory().await.unwrap();
        let service = SubmissionService::new(db);

        let outcome = service.submit(&sub(Game::Game1, "AAA", 100)).await.unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.rank, Some(1));
        assert_eq!(outcome.score, 100);
        assert_eq!(outcome.username.as_str(), "AAA");
        assert_eq!(outcome.game, Game::Game1);
    }

    #[tokio::test]
    async fn test_lower_score_keeps_best_and_stamp() {
        let db = Database::new_in_memory().await.unwrap();
        let service = SubmissionService::new(db.clone());

        service.submit(&sub(Game::Game1, "AAA", 100)).await.unwrap();
        let before = load_board(db.pool(), Game::Game1).await.unwrap();

        let outcome = service.submit(&sub(Game::Game1, "AAA", 50)).await.unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.rank, Some(1));
        assert_eq!(outcome.score, 100);

        let after = load_board(db.pool(), Game::Game1).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_resubmitting_same_score_is_idempotent() {
        let db = Database::new_in_memory().await.unwrap();
        let service = SubmissionService::new(db.clone());

        service.submit(&sub(Game::Game2, "BBB", 10)).await.unwrap();
        let first = service.submit(&sub(Game::Game2, "AAA", 42)).await.unwrap();
        let before = load_board(db.pool(), Game::Game2).await.unwrap();

        let second = service.submit(&sub(Game::Game2, "AAA", 42)).await.unwrap();
        let after = load_board(db.pool(), Game::Game2).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_higher_score_overtakes() {
        let db = Database::new_in_memory().await.unwrap();
        let service = SubmissionService::new(db);

        service.submit(&sub(Game::Game1, "AAA", 100)).await.unwrap();
        let bbb = service.submit(&sub(Game::Game1, "BBB", 150)).await.unwrap();
        assert_eq!(bbb.rank, Some(1));

        let aaa = service.submit(&sub(Game::Game1, "AAA", 10)).await.unwrap();
        assert_eq!(aaa.rank, Some(2));
        assert_eq!(aaa.score, 100);
    }

    #[tokio::test]
    async fn test_insert_then_prune_is_not_accepted() {
        let db = Database::new_in_memory().await.unwrap();
        let service = SubmissionService::with_top_n(db.clone(), 2);

        service.submit(&sub(Game::Game1, "AAA", 30)).await.unwrap();
        service.submit(&sub(Game::Game1, "BBB", 20)).await.unwrap();

        let outcome = service.submit(&sub(Game::Game1, "CCC", 5)).await.unwrap();
        assert!(!outcome.accepted);
        assert_eq!(outcome.rank, None);
        assert_eq!(outcome.score, 5);

        let board = load_board(db.pool(), Game::Game1).await.unwrap();
        assert_eq!(board.len(), 2);
        assert!(board.iter().all(|r| r.username.as_str() != "CCC"));
    }

    #[tokio::test]
    async fn test_new_entry_pushes_last_place_out() {
        let db = Database::new_in_memory().await.unwrap();
        let service = SubmissionService::with_top_n(db.clone(), 2);

        service.submit(&sub(Game::Game1, "AAA", 30)).await.unwrap();
        service.submit(&sub(Game::Game1, "BBB", 20)).await.unwrap();
        let outcome = service.submit(&sub(Game::Game1, "CCC", 25)).await.unwrap();
        assert_eq!(outcome.rank, Some(2));

        let board = load_board(db.pool(), Game::Game1).await.unwrap();
        let names: Vec<&str> = board.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(names, vec!["AAA", "CCC"]);
    }

    #[tokio::test]
    async fn test_tie_with_cutoff_loses_to_earlier_record() {
        let db = Database::new_in_memory().await.unwrap();
        let service = SubmissionService::with_top_n(db, 2);

        service.submit(&sub(Game::Game1, "ZZZ", 30)).await.unwrap();
        service.submit(&sub(Game::Game1, "YYY", 20)).await.unwrap();

        // Same score as the cutoff, alphabetically earlier, but later stamp.
        let outcome = service.submit(&sub(Game::Game1, "AAA", 20)).await.unwrap();
        assert!(!outcome.accepted);
    }

    #[tokio::test]
    async fn test_failed_submission_leaves_no_trace() {
        let db = Database::new_in_memory().await.unwrap();
        let service = SubmissionService::new(db.clone());

        service.submit(&sub(Game::Game1, "AAA", 10)).await.unwrap();
        // Make every delete fail so the prune step errors out.
        sqlx::query("CREATE TRIGGER fail_delete BEFORE DELETE ON scores BEGIN SELECT RAISE(ABORT, 'boom'); END")
            .execute(db.pool())
            .await
            .unwrap();

        let small = SubmissionService::with_top_n(db.clone(), 1);
        let err = small.submit(&sub(Game::Game1, "BBB", 99)).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::TransactionFailure(_)));

        let board = load_board(db.pool(), Game::Game1).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].username.as_str(), "AAA");

        let (submissions,): (i64,) =
            sqlx::query_as("SELECT submissions FROM boards WHERE game = 'game1'")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(submissions, 1);
    }

    #[tokio::test]
    async fn test_write_lock_timeout_reports_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = crate::store::DatabaseConfig::new(dir.path().join("scores.db"));
        config.busy_timeout = std::time::Duration::from_millis(50);
        let db = Database::open(&config).await.unwrap();
        let service = SubmissionService::new(db.clone());

        let mut holder = db.pool().acquire().await.unwrap();
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *holder)
            .await
            .unwrap();

        let err = service.submit(&sub(Game::Game1, "AAA", 1)).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::StorageUnavailable(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::SERVICE_UNAVAILABLE);

        sqlx::query("ROLLBACK").execute(&mut *holder).await.unwrap();
        drop(holder);

        let outcome = service.submit(&sub(Game::Game1, "AAA", 1)).await.unwrap();
        assert_eq!(outcome.rank, Some(1));
        db.close().await;
    }

    #[tokio::test]
    async fn test_closed_pool_reports_unavailable() {
        let db = Database::new_in_memory().await.unwrap();
        let service = SubmissionService::new(db.clone());
        db.close().await;

        let err = service.submit(&sub(Game::Game1, "AAA", 1)).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::StorageUnavailable(_)));
    }
}
