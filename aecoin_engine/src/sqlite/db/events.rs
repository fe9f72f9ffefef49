use serde_json::Value;
use sqlx::SqliteConnection;

use crate::db_types::{OrderEvent, OrderEventType};

pub async fn insert_event(
    order_id: i64,
    event_type: OrderEventType,
    payload: Value,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO order_events (order_id, event_type, payload) VALUES ($1, $2, $3)")
        .bind(order_id)
        .bind(event_type)
        .bind(payload.to_string())
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn fetch_events_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderEvent>, sqlx::Error> {
    let events = sqlx::query_as("SELECT * FROM order_events WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(events)
}
