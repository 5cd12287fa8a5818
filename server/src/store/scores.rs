//! Best-score rows: the board claim and the conditional upsert.
//!
//! Functions take any SQLite executor so they can run against the pool or
//! inside a submission transaction (`&mut *tx`).

use leaderboard::{Game, Username};
use sqlx::{Executor, Sqlite};

/// The row left behind by [`upsert_best`].
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StoredScore {
    pub id: String,
    pub score: i64,
    pub created_at: i64,
}

/// Claim the board row for `game` and hand out its next stamp.
///
/// The stamp is `max(previous + 1, now)`, so stamps on one board strictly
/// increase even if the wall clock stalls or steps back. Being a write, this
/// must be the first statement of a submission transaction: it takes the
/// write lock before anything is read, so concurrent submissions queue here
/// instead of racing on a stale snapshot.
pub async fn claim_board<'e, E>(executor: E, game: Game, now: i64) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let (stamp,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO boards (game, last_stamp, submissions)
        VALUES (?, ?, 1)
        ON CONFLICT (game) DO UPDATE SET
            last_stamp = MAX(boards.last_stamp + 1, excluded.last_stamp),
            submissions = boards.submissions + 1
        RETURNING last_stamp
        "#,
    )
    .bind(game.as_str())
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(stamp)
}

/// Insert the player's score, or keep the greater of stored and submitted.
///
/// `created_at` only moves to `stamp` when `score` strictly beats the stored
/// score; an equal or lower score leaves the row as it was. The whole
/// decision happens in one statement.
pub async fn upsert_best<'e, E>(
    executor: E,
    game: Game,
    username: &Username,
    score: i64,
    stamp: i64,
) -> Result<StoredScore, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let new_id = uuid::Uuid::new_v4().to_string();

    sqlx::query_as(
        r#"
        INSERT INTO scores (id, game, username, score, created_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (game, username) DO UPDATE SET
            score = MAX(scores.score, excluded.score),
            created_at = CASE
                WHEN excluded.score > scores.score THEN excluded.created_at
                ELSE scores.created_at
            END
        RETURNING id, score, created_at
        "#,
    )
    .bind(new_id)
    .bind(game.as_str())
    .bind(username.as_str())
    .bind(score)
    .bind(stamp)
    .fetch_one(executor)
    .await
}

/// Every record of `game` in canonical order.
#[cfg(test)]
pub async fn load_board<'e, E>(
    executor: E,
    game: Game,
) -> Result<Vec<leaderboard::ScoreRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT id, username, score, created_at FROM scores WHERE game = ? ORDER BY {}",
        crate::ranking::CANONICAL_ORDER
    );
    let rows: Vec<(String, String, i64, i64)> =
        sqlx::query_as(&sql).bind(game.as_str()).fetch_all(executor).await?;

    rows.into_iter()
        .map(|(id, username, score, created_at)| {
            let username =
                Username::parse(&username).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
            Ok(leaderboard::ScoreRecord {
                id,
                game,
                username,
                score,
                created_at,
            })
        })
        .collect()
}
