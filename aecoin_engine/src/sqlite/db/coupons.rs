use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::CouponCode;

/// The number of unused codes for the product. Advisory outside of a transaction.
pub async fn available_count(product_id: i64, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM coupon_codes WHERE product_id = $1 AND is_used = 0")
            .bind(product_id)
            .fetch_one(conn)
            .await?;
    Ok(count)
}

/// Atomically claim up to `quantity` unused codes for the order.
///
/// The single UPDATE..WHERE id IN (SELECT..) is the reason two concurrent allocations can never hand out the same
/// code: SQLite serializes the writes, and the inner SELECT only ever sees codes that are still unused at that
/// point. The caller must run this inside a transaction and roll back if fewer than `quantity` rows come back.
pub async fn allocate_codes(
    product_id: i64,
    order_id: i64,
    email: &str,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<CouponCode>, sqlx::Error> {
    trace!("🗃️ Allocating {quantity} codes for order {order_id} (product {product_id})");
    let codes = sqlx::query_as(
        r#"
            UPDATE coupon_codes
            SET is_used = 1,
                used_by_email = $1,
                order_id = $2,
                reserved_at = CURRENT_TIMESTAMP
            WHERE id IN (
                SELECT id FROM coupon_codes
                WHERE product_id = $3 AND is_used = 0
                ORDER BY id
                LIMIT $4
            )
            RETURNING *;
        "#,
    )
    .bind(email)
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_all(conn)
    .await?;
    Ok(codes)
}

pub async fn fetch_codes_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<CouponCode>, sqlx::Error> {
    let codes = sqlx::query_as("SELECT * FROM coupon_codes WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(codes)
}

/// Inventory intake. Codes are unique across the whole table; a duplicate aborts the batch.
pub async fn insert_codes(product_id: i64, codes: &[String], conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let mut inserted = 0u64;
    for code in codes {
        let res = sqlx::query("INSERT INTO coupon_codes (code, product_id) VALUES ($1, $2)")
            .bind(code)
            .bind(product_id)
            .execute(&mut *conn)
            .await?;
        inserted += res.rows_affected();
    }
    Ok(inserted)
}
