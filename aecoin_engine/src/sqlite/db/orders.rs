use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewOrder, Order, OrderNumber};

/// Inserts a new `pending` order using the given connection. This is not atomic. You can embed this call inside a
/// transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (order_number, email, product_id, quantity, subtotal)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order.order_number)
    .bind(order.email)
    .bind(order.product_id)
    .bind(order.quantity)
    .bind(order.subtotal)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order [{}] inserted with id {}", order.order_number, order.id);
    Ok(order)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_number(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE order_number = $1")
        .bind(number.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Returns the order matching the given gateway bill code or order number. If a bill code and an order number match
/// on different orders, the bill-code match wins.
pub async fn fetch_order_by_reference(reference: &str, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        "SELECT * FROM orders WHERE gateway_bill_code = $1 OR order_number = $1 ORDER BY (gateway_bill_code = $1) \
         DESC LIMIT 1",
    )
    .bind(reference)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

pub async fn set_payment_details(
    order_id: i64,
    bill_code: &str,
    payment_url: &str,
    gateway: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders
            SET gateway_bill_code = $1, payment_url = $2, gateway = $3, updated_at = CURRENT_TIMESTAMP
            WHERE id = $4
            RETURNING *;
        "#,
    )
    .bind(bill_code)
    .bind(payment_url)
    .bind(gateway)
    .bind(order_id)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

/// The conditional `failed` transition. Returns `None` when the order had already left `pending`, so a stale caller
/// can never clobber a terminal state. `COALESCE` keeps an already-recorded gateway reference when the caller has
/// none.
pub async fn mark_failed(
    order_id: i64,
    gateway_ref: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders
            SET status = 'failed', gateway_ref = COALESCE($1, gateway_ref), updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND status = 'pending'
            RETURNING *;
        "#,
    )
    .bind(gateway_ref)
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

pub async fn record_pending_reference(
    order_id: i64,
    gateway_ref: &str,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE orders SET gateway_ref = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status = 'pending'",
    )
    .bind(gateway_ref)
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// The conditional `paid` transition. Returns `None` when the order was not `pending`, which is how a concurrent or
/// repeated confirmation is detected.
pub async fn mark_paid_if_pending(
    order_id: i64,
    gateway_ref: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders
            SET status = 'paid',
                gateway_ref = $1,
                paid_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND status = 'pending'
            RETURNING *;
        "#,
    )
    .bind(gateway_ref)
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}
