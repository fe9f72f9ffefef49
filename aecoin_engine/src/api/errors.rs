use thiserror::Error;

use crate::traits::StorefrontError;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Invalid checkout request: {0}")]
    ValidationError(String),
    #[error("Too many checkout attempts. Please try again later.")]
    RateLimited,
    #[error("Product {0} not found")]
    ProductNotFound(i64),
    #[error("Insufficient stock available: {available} of {requested} requested")]
    InsufficientStock { requested: i64, available: i64 },
    #[error("Storage error during checkout: {0}")]
    DatabaseError(#[from] StorefrontError),
}

#[derive(Debug, Error)]
pub enum FulfillmentError {
    #[error("Storage error during fulfillment: {0}")]
    DatabaseError(#[from] StorefrontError),
}
