//! Store-backed ranking: rank lookup, cutoff, pruning, listing and preview.
//!
//! All ordered queries splice in [`CANONICAL_ORDER`], so a record's reported
//! rank, the cutoff at position N and the set of pruned records can never
//! disagree. The same order is [`leaderboard::RankKey`] on the Rust side.

use leaderboard::{Game, Preview, PreviewCounts, Username};
use serde::Serialize;
use sqlx::{Executor, Sqlite};

/// `ORDER BY` body for the canonical ranking order.
pub const CANONICAL_ORDER: &str = "score DESC, created_at ASC, username ASC";

/// One line of a listed leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct LeaderboardRow {
    pub rank: i64,
    pub score: i64,
    pub username: String,
}

/// 1-based rank of record `id` on `game`'s board, `None` if it is gone.
pub async fn rank_of<'e, E>(executor: E, game: Game, id: &str) -> Result<Option<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        SELECT rank FROM (
            SELECT id, RANK() OVER (ORDER BY {CANONICAL_ORDER}) AS rank
            FROM scores
            WHERE game = ?
        )
        WHERE id = ?
        "#
    );
    let row: Option<(i64,)> = sqlx::query_as(&sql)
        .bind(game.as_str())
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(|(rank,)| rank))
}

/// Score at position `n`, `None` while the board holds fewer than `n` records.
pub async fn cutoff_score<'e, E>(executor: E, game: Game, n: u32) -> Result<Option<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let Some(offset) = n.checked_sub(1) else {
        return Ok(None);
    };
    let sql = format!(
        "SELECT score FROM scores WHERE game = ? ORDER BY {CANONICAL_ORDER} LIMIT 1 OFFSET ?"
    );
    let row: Option<(i64,)> = sqlx::query_as(&sql)
        .bind(game.as_str())
        .bind(i64::from(offset))
        .fetch_optional(executor)
        .await?;

    Ok(row.map(|(score,)| score))
}

/// Delete every record of `game` past position `n`. Returns how many went.
pub async fn prune<'e, E>(executor: E, game: Game, n: u32) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        DELETE FROM scores
        WHERE id IN (
            SELECT id FROM scores
            WHERE game = ?
            ORDER BY {CANONICAL_ORDER}
            LIMIT -1 OFFSET ?
        )
        "#
    );
    let result = sqlx::query(&sql)
        .bind(game.as_str())
        .bind(i64::from(n))
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// The top `limit` records of `game`, ranked.
pub async fn listing<'e, E>(
    executor: E,
    game: Game,
    limit: u32,
) -> Result<Vec<LeaderboardRow>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        SELECT RANK() OVER (ORDER BY {CANONICAL_ORDER}) AS rank, score, username
        FROM scores
        WHERE game = ?
        ORDER BY {CANONICAL_ORDER}
        LIMIT ?
        "#
    );
    sqlx::query_as(&sql)
        .bind(game.as_str())
        .bind(i64::from(limit))
        .fetch_all(executor)
        .await
}

/// Counts feeding [`Preview::from_counts`]. `exclude` drops one player's
/// own record from every count.
pub async fn preview_counts<'e, E>(
    executor: E,
    game: Game,
    score: i64,
    exclude: Option<&Username>,
) -> Result<PreviewCounts, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let exclude = exclude.map(Username::as_str);
    let (greater, equal, total): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(CASE WHEN score > ? THEN 1 END),
            COUNT(CASE WHEN score = ? THEN 1 END),
            COUNT(*)
        FROM scores
        WHERE game = ? AND (? IS NULL OR username <> ?)
        "#,
    )
    .bind(score)
    .bind(score)
    .bind(game.as_str())
    .bind(exclude)
    .bind(exclude)
    .fetch_one(executor)
    .await?;

    Ok(PreviewCounts {
        greater: greater as u64,
        equal: equal as u64,
        total: total as u64,
    })
}

/// Where `score` would land on `game`'s board with `n` places.
pub async fn preview_rank<'e, E>(
    executor: E,
    game: Game,
    score: i64,
    n: u32,
    exclude: Option<&Username>,
) -> Result<Preview, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let counts = preview_counts(executor, game, score, exclude).await?;
    Ok(Preview::from_counts(counts, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::scores::{load_board, upsert_best};
    use crate::store::Database;

    fn name(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    /// Seed `game` with `(username, score, created_at)` rows.
    async fn seed(db: &Database, game: Game, rows: &[(&str, i64, i64)]) -> Vec<String> {
        let mut ids = Vec::new();
        for (user, score, stamp) in rows {
            let stored = upsert_best(db.pool(), game, &name(user), *score, *stamp)
                .await
                .unwrap();
            ids.push(stored.id);
        }
        ids
    }

    #[tokio::test]
    async fn test_rank_of_follows_canonical_order() {
        let db = Database::new_in_memory().await.unwrap();
        let ids = seed(
            &db,
            Game::Game1,
            &[("CCC", 10, 1), ("AAA", 20, 2), ("BBB", 10, 1), ("DDD", 10, 0)],
        )
        .await;

        assert_eq!(rank_of(db.pool(), Game::Game1, &ids[1]).await.unwrap(), Some(1));
        // Equal score: earliest stamp first.
        assert_eq!(rank_of(db.pool(), Game::Game1, &ids[3]).await.unwrap(), Some(2));
        // Equal score and stamp: username decides.
        assert_eq!(rank_of(db.pool(), Game::Game1, &ids[2]).await.unwrap(), Some(3));
        assert_eq!(rank_of(db.pool(), Game::Game1, &ids[0]).await.unwrap(), Some(4));
    }

    #[tokio::test]
    async fn test_rank_of_is_scoped_to_game() {
        let db = Database::new_in_memory().await.unwrap();
        let ids = seed(&db, Game::Game1, &[("AAA", 10, 1)]).await;
        seed(&db, Game::Game2, &[("BBB", 99, 1)]).await;

        assert_eq!(rank_of(db.pool(), Game::Game1, &ids[0]).await.unwrap(), Some(1));
        assert_eq!(rank_of(db.pool(), Game::Game2, &ids[0]).await.unwrap(), None);
        assert_eq!(rank_of(db.pool(), Game::Game1, "missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cutoff_score() {
        let db = Database::new_in_memory().await.unwrap();
        seed(&db, Game::Game1, &[("AAA", 30, 1), ("BBB", 20, 2), ("CCC", 10, 3)]).await;

        assert_eq!(cutoff_score(db.pool(), Game::Game1, 3).await.unwrap(), Some(10));
        assert_eq!(cutoff_score(db.pool(), Game::Game1, 2).await.unwrap(), Some(20));
        assert_eq!(cutoff_score(db.pool(), Game::Game1, 4).await.unwrap(), None);
        assert_eq!(cutoff_score(db.pool(), Game::Game1, 0).await.unwrap(), None);
        assert_eq!(cutoff_score(db.pool(), Game::Game2, 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_prune_removes_tail_only() {
        let db = Database::new_in_memory().await.unwrap();
        seed(
            &db,
            Game::Game1,
            &[("AAA", 30, 1), ("BBB", 20, 2), ("CCC", 20, 3), ("DDD", 5, 4)],
        )
        .await;
        seed(&db, Game::Game2, &[("EEE", 1, 1), ("FFF", 1, 2), ("GGG", 1, 3)]).await;

        let removed = prune(db.pool(), Game::Game1, 2).await.unwrap();
        assert_eq!(removed, 2);

        let board = load_board(db.pool(), Game::Game1).await.unwrap();
        let names: Vec<&str> = board.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(names, vec!["AAA", "BBB"]);

        // Other games untouched.
        assert_eq!(load_board(db.pool(), Game::Game2).await.unwrap().len(), 3);

        assert_eq!(prune(db.pool(), Game::Game1, 2).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_listing_is_dense_and_ordered() {
        let db = Database::new_in_memory().await.unwrap();
        seed(
            &db,
            Game::Game1,
            &[("AAA", 10, 3), ("BBB", 10, 2), ("CCC", 10, 2), ("DDD", 40, 9)],
        )
        .await;

        let rows = listing(db.pool(), Game::Game1, 10).await.unwrap();
        let ranks: Vec<i64> = rows.iter().map(|r| r.rank).collect();
        let names: Vec<&str> = rows.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert_eq!(names, vec!["DDD", "BBB", "CCC", "AAA"]);

        let top_two = listing(db.pool(), Game::Game1, 2).await.unwrap();
        assert_eq!(top_two.len(), 2);
        assert_eq!(top_two[1].username, "BBB");
    }

    #[tokio::test]
    async fn test_preview_counts_ties_as_ahead() {
        let db = Database::new_in_memory().await.unwrap();
        seed(&db, Game::Game1, &[("AAA", 30, 1), ("BBB", 20, 2), ("CCC", 20, 3)]).await;

        let p = preview_rank(db.pool(), Game::Game1, 20, 100, None).await.unwrap();
        assert_eq!(p.rank, 4);
        assert!(p.qualifies);
        assert_eq!(p.current_rows, 3);

        let p = preview_rank(db.pool(), Game::Game1, 20, 3, None).await.unwrap();
        assert_eq!(p.rank, 4);
        assert!(!p.qualifies);

        let p = preview_rank(db.pool(), Game::Game1, 31, 3, None).await.unwrap();
        assert_eq!(p.rank, 1);
        assert!(p.qualifies);
    }

    #[tokio::test]
    async fn test_preview_excluding_player() {
        let db = Database::new_in_memory().await.unwrap();
        seed(&db, Game::Game1, &[("AAA", 30, 1), ("BBB", 20, 2)]).await;

        let p = preview_rank(db.pool(), Game::Game1, 30, 2, Some(&name("AAA")))
            .await
            .unwrap();
        assert_eq!(p.rank, 1);
        assert_eq!(p.current_rows, 1);
        assert!(p.qualifies);
    }

    #[tokio::test]
    async fn test_preview_empty_board() {
        let db = Database::new_in_memory().await.unwrap();
        let p = preview_rank(db.pool(), Game::Game3Level1, 0, 100, None).await.unwrap();
        assert_eq!(p.rank, 1);
        assert!(p.qualifies);
        assert_eq!(p.current_rows, 0);
    }
}
