use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order with id {0} does not exist")]
    OrderNotFound(i64),
    #[error("Product with id {0} does not exist")]
    ProductNotFound(i64),
}

impl From<sqlx::Error> for StorefrontError {
    fn from(e: sqlx::Error) -> Self {
        StorefrontError::DatabaseError(e.to_string())
    }
}
