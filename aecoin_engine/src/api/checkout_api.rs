use std::fmt::Debug;

use chrono::Duration;
use log::*;
use serde_json::json;

use crate::{
    api::{errors::CheckoutError, objects::CheckoutRequest},
    db_types::{NewOrder, Order, OrderNumber},
    helpers::{generate_order_number, is_valid_email},
    traits::{RateLimiterStore, StorefrontDatabase, StorefrontError},
};

pub const MAX_QUANTITY_PER_LINE: i64 = 10;
const DEFAULT_MAX_ATTEMPTS: u64 = 5;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: i64 = 3600;

/// `CheckoutApi` validates a cart, applies the per-email rate limit, prices the order and stores it as `pending`.
///
/// Gateway interaction happens in the caller (the HTTP layer owns the gateway clients); once a bill exists the
/// caller reports back via [`Self::payment_initiated`] or [`Self::checkout_gateway_failed`].
pub struct CheckoutApi<B> {
    db: B,
    max_attempts: u64,
    rate_limit_window: Duration,
}

impl<B> Debug for CheckoutApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi")
    }
}

impl<B> CheckoutApi<B> {
    pub fn new(db: B) -> Self {
        Self { db, max_attempts: DEFAULT_MAX_ATTEMPTS, rate_limit_window: Duration::seconds(DEFAULT_RATE_LIMIT_WINDOW_SECS) }
    }

    /// Override the rate-limit parameters. Mainly useful in tests, where a one-hour window is impractical.
    pub fn with_rate_limit(mut self, max_attempts: u64, window: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.rate_limit_window = window;
        self
    }
}

impl<B> CheckoutApi<B>
where B: StorefrontDatabase + RateLimiterStore
{
    /// Run the checkout pipeline up to (but excluding) bill creation.
    ///
    /// Although the request accepts multiple cart lines, only the first line is priced and ordered. Orders hold a
    /// single product.
    pub async fn process_checkout(&self, req: CheckoutRequest) -> Result<Order, CheckoutError> {
        validate_request(&req)?;
        let attempts = self.db.increment(&format!("checkout:{}", req.email), self.rate_limit_window).await?;
        if attempts > self.max_attempts {
            debug!("🛍️ Rate limit hit for {} (attempt #{attempts})", req.email);
            return Err(CheckoutError::RateLimited);
        }
        let line = &req.items[0];
        let product = self
            .db
            .fetch_active_product(line.product_id)
            .await?
            .ok_or(CheckoutError::ProductNotFound(line.product_id))?;
        let available = self.db.available_stock(product.id).await?;
        if available < line.quantity {
            debug!("🛍️ Advisory stock check failed for product {}: {available} < {}", product.id, line.quantity);
            return Err(CheckoutError::InsufficientStock { requested: line.quantity, available });
        }
        let subtotal = product.price_now * line.quantity;
        let new_order = NewOrder {
            order_number: generate_order_number(),
            email: req.email.clone(),
            product_id: product.id,
            quantity: line.quantity,
            subtotal,
        };
        let payload = json!({ "email": req.email, "items": req.items, "subtotal": subtotal });
        let order = self.db.insert_order(new_order, payload).await?;
        info!("🛍️ Order {} created for {} ({} x product {})", order.order_number, order.email, order.quantity, order.product_id);
        Ok(order)
    }

    /// Record a successfully created bill against the order and append the `payment_initiated` event.
    pub async fn payment_initiated(
        &self,
        order_id: i64,
        bill_code: &str,
        payment_url: &str,
        gateway: &str,
    ) -> Result<Order, CheckoutError> {
        let order = self.db.set_payment_details(order_id, bill_code, payment_url, gateway).await?;
        debug!("🛍️ Payment initiated for order {} via {gateway}", order.order_number);
        Ok(order)
    }

    /// All gateway candidates failed at bill creation. The order flips to `failed` (it is never deleted, preserving
    /// the audit trail for failed attempts) and the error detail lands in the `payment_failed` event.
    pub async fn checkout_gateway_failed(&self, order_id: i64, error: &str) -> Result<(), CheckoutError> {
        match self.db.mark_order_failed(order_id, None, json!({ "error": error })).await? {
            Some(order) => warn!("🛍️ Order {} failed at bill creation: {error}", order.order_number),
            None => warn!("🛍️ Order {order_id} was no longer pending when bill creation failed: {error}"),
        }
        Ok(())
    }

    pub async fn order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, StorefrontError> {
        self.db.fetch_order_by_number(number).await
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

fn validate_request(req: &CheckoutRequest) -> Result<(), CheckoutError> {
    if !is_valid_email(&req.email) {
        return Err(CheckoutError::ValidationError("A valid email address is required".to_string()));
    }
    if req.items.is_empty() {
        return Err(CheckoutError::ValidationError("Cart is empty".to_string()));
    }
    if req.items.iter().any(|l| l.quantity < 1 || l.quantity > MAX_QUANTITY_PER_LINE) {
        return Err(CheckoutError::ValidationError(format!(
            "Quantity must be between 1 and {MAX_QUANTITY_PER_LINE}"
        )));
    }
    if !req.terms_accepted {
        return Err(CheckoutError::ValidationError("You must accept the terms and conditions".to_string()));
    }
    Ok(())
}
