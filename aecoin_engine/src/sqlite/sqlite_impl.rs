//! `SqliteDatabase` is a concrete implementation of the storefront backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use chrono::Duration;
use log::*;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use super::db::{coupons, db_url, events, new_pool, orders, products, rate_limit};
use crate::{
    db_types::{CouponCode, NewOrder, NewProduct, Order, OrderEvent, OrderEventType, OrderNumber, Product},
    traits::{AllocationOutcome, RateLimiterStore, StorefrontDatabase, StorefrontError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database instance using the `AEC_DATABASE_URL` environment variable, or the default.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl StorefrontDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_active_product(&self, product_id: i64) -> Result<Option<Product>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_active_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn available_stock(&self, product_id: i64) -> Result<i64, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let count = coupons::available_count(product_id, &mut conn).await?;
        Ok(count)
    }

    async fn insert_order(&self, order: NewOrder, event_payload: Value) -> Result<Order, StorefrontError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        events::insert_event(order.id, OrderEventType::Created, event_payload, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn fetch_order_by_reference(&self, reference: &str) -> Result<Option<Order>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_reference(reference, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_number(number, &mut conn).await?;
        Ok(order)
    }

    async fn set_payment_details(
        &self,
        order_id: i64,
        bill_code: &str,
        payment_url: &str,
        gateway: &str,
    ) -> Result<Order, StorefrontError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::set_payment_details(order_id, bill_code, payment_url, gateway, &mut tx).await?;
        let payload = json!({ "gateway": gateway, "bill_code": bill_code });
        events::insert_event(order_id, OrderEventType::PaymentInitiated, payload, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn mark_order_failed(
        &self,
        order_id: i64,
        gateway_ref: Option<String>,
        payload: Value,
    ) -> Result<Option<Order>, StorefrontError> {
        let mut tx = self.pool.begin().await?;
        let Some(order) = orders::mark_failed(order_id, gateway_ref.as_deref(), &mut tx).await? else {
            tx.rollback().await?;
            debug!("🗃️ Order {order_id} had already left pending. Not marking it failed.");
            return Ok(None);
        };
        events::insert_event(order_id, OrderEventType::PaymentFailed, payload, &mut tx).await?;
        tx.commit().await?;
        Ok(Some(order))
    }

    async fn record_pending_reference(&self, order_id: i64, gateway_ref: &str) -> Result<(), StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        orders::record_pending_reference(order_id, gateway_ref, &mut conn).await?;
        Ok(())
    }

    /// In a single atomic transaction,
    /// * claims up to `order.quantity` unused codes for the order's product,
    /// * if too few codes exist, rolls the claim back (no codes are consumed) and marks the order `failed` in a
    ///   follow-up transaction,
    /// * otherwise conditionally flips the order from `pending` to `paid`; if the order was no longer pending the
    ///   claim is rolled back and `AlreadyProcessed` is returned.
    async fn fulfill_order(&self, order: &Order, gateway_ref: &str) -> Result<AllocationOutcome, StorefrontError> {
        let mut tx = self.pool.begin().await?;
        let codes = coupons::allocate_codes(order.product_id, order.id, &order.email, order.quantity, &mut tx).await?;
        let available = codes.len() as i64;
        if available < order.quantity {
            tx.rollback().await?;
            warn!(
                "🗃️ Only {available} of {} codes available for order {}. Rolling back allocation.",
                order.quantity, order.order_number
            );
            let mut tx = self.pool.begin().await?;
            let Some(failed) = orders::mark_failed(order.id, Some(gateway_ref), &mut tx).await? else {
                // The order left pending under our feet (a concurrent confirmation fulfilled or failed it). The
                // shortfall we observed was stale; change nothing.
                tx.rollback().await?;
                return Ok(AllocationOutcome::AlreadyProcessed);
            };
            let payload = json!({ "requested": order.quantity, "available": available });
            events::insert_event(order.id, OrderEventType::CodesError, payload, &mut tx).await?;
            tx.commit().await?;
            return Ok(AllocationOutcome::InsufficientCodes { order: failed, requested: order.quantity, available });
        }
        match orders::mark_paid_if_pending(order.id, gateway_ref, &mut tx).await? {
            Some(paid) => {
                let payload = json!({ "gateway_ref": gateway_ref, "codes_allocated": available });
                events::insert_event(order.id, OrderEventType::PaymentCompleted, payload, &mut tx).await?;
                tx.commit().await?;
                debug!("🗃️ Order {} marked paid with {available} codes.", paid.order_number);
                Ok(AllocationOutcome::Fulfilled { order: paid, codes })
            },
            None => {
                tx.rollback().await?;
                Ok(AllocationOutcome::AlreadyProcessed)
            },
        }
    }

    async fn append_event(
        &self,
        order_id: i64,
        event_type: OrderEventType,
        payload: Value,
    ) -> Result<(), StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        events::insert_event(order_id, event_type, payload, &mut conn).await?;
        Ok(())
    }

    async fn fetch_events_for_order(&self, order_id: i64) -> Result<Vec<OrderEvent>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let events = events::fetch_events_for_order(order_id, &mut conn).await?;
        Ok(events)
    }

    async fn fetch_codes_for_order(&self, order_id: i64) -> Result<Vec<CouponCode>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let codes = coupons::fetch_codes_for_order(order_id, &mut conn).await?;
        Ok(codes)
    }

    async fn insert_codes(&self, product_id: i64, codes: &[String]) -> Result<u64, StorefrontError> {
        let mut tx = self.pool.begin().await?;
        let inserted = coupons::insert_codes(product_id, codes, &mut tx).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(product, &mut conn).await?;
        Ok(product)
    }
}

impl RateLimiterStore for SqliteDatabase {
    async fn increment(&self, key: &str, window: Duration) -> Result<u64, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let count = rate_limit::increment(key, window, &mut conn).await?;
        Ok(count)
    }
}
