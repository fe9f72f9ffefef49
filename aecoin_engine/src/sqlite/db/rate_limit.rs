use chrono::Duration;
use sqlx::SqliteConnection;

/// Bump the counter for `key`, restarting the window when it has lapsed, and return the new count.
///
/// The whole read-modify-write happens inside one UPSERT so concurrent checkouts for the same email each see a
/// distinct count.
pub async fn increment(key: &str, window: Duration, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let window_secs = window.num_seconds();
    let (count,): (i64,) = sqlx::query_as(
        r#"
            INSERT INTO rate_limits (key, count, window_started_at)
            VALUES ($1, 1, CURRENT_TIMESTAMP)
            ON CONFLICT (key) DO UPDATE SET
                count = CASE
                    WHEN unixepoch(CURRENT_TIMESTAMP) - unixepoch(window_started_at) >= $2 THEN 1
                    ELSE count + 1
                END,
                window_started_at = CASE
                    WHEN unixepoch(CURRENT_TIMESTAMP) - unixepoch(window_started_at) >= $2 THEN CURRENT_TIMESTAMP
                    ELSE window_started_at
                END
            RETURNING count;
        "#,
    )
    .bind(key)
    .bind(window_secs)
    .fetch_one(conn)
    .await?;
    Ok(count as u64)
}
