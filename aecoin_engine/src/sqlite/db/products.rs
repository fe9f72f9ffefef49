use sqlx::SqliteConnection;

use crate::db_types::{NewProduct, Product};

pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product =
        sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_active_product(
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1 AND is_active = 1")
        .bind(product_id)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product = sqlx::query_as(
        r#"
            INSERT INTO products (sku, title, amount_ae, price_original, price_now, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(product.sku)
    .bind(product.title)
    .bind(product.amount_ae)
    .bind(product.price_original)
    .bind(product.price_now)
    .bind(product.is_active)
    .fetch_one(conn)
    .await?;
    Ok(product)
}
