use serde_json::Value;

use crate::{
    db_types::{CouponCode, NewOrder, NewProduct, Order, OrderEvent, OrderEventType, OrderNumber, Product},
    traits::{AllocationOutcome, StorefrontError},
};

/// The storage behaviour backing the storefront: products, the coupon-code inventory, orders, and the append-only
/// order-event log.
///
/// Two operations carry the system's correctness guarantees and must be atomic:
/// * [`Self::insert_order`] stores the order and its `created` event in one transaction.
/// * [`Self::fulfill_order`] is the linchpin: in a single transaction it conditionally allocates codes and flips the
///   order to `paid`. Two concurrent confirmations for different orders on the same product must never receive the
///   same code, and a duplicate confirmation for one order must never allocate twice.
#[allow(async_fn_in_trait)]
pub trait StorefrontDatabase {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Fetch a product by id, active or not.
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, StorefrontError>;

    /// Fetch a product by id, but only if it is active.
    async fn fetch_active_product(&self, product_id: i64) -> Result<Option<Product>, StorefrontError>;

    /// Count of unused codes for a product. Advisory only: the count can change between this check and allocation.
    async fn available_stock(&self, product_id: i64) -> Result<i64, StorefrontError>;

    /// Store a new `pending` order together with its `created` event, atomically. Returns the stored record.
    async fn insert_order(&self, order: NewOrder, event_payload: Value) -> Result<Order, StorefrontError>;

    /// Locate an order by gateway bill/session reference or by order number, whichever matches.
    async fn fetch_order_by_reference(&self, reference: &str) -> Result<Option<Order>, StorefrontError>;

    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, StorefrontError>;

    /// Record the created bill on the order (bill code, payment URL, realized gateway) and append a
    /// `payment_initiated` event.
    async fn set_payment_details(
        &self,
        order_id: i64,
        bill_code: &str,
        payment_url: &str,
        gateway: &str,
    ) -> Result<Order, StorefrontError>;

    /// Transition a `pending` order to `failed` and append a `payment_failed` event. If a gateway reference is
    /// supplied it is recorded for the audit trail. Returns `None` without changing anything when the order had
    /// already left `pending`: `paid` and `failed` are terminal, and a late or duplicate failure notification must
    /// never clobber them. The order row itself is never deleted.
    async fn mark_order_failed(
        &self,
        order_id: i64,
        gateway_ref: Option<String>,
        payload: Value,
    ) -> Result<Option<Order>, StorefrontError>;

    /// Record the gateway reference for a confirmation that reported a still-pending payment. The status stays
    /// `pending` and nothing is allocated.
    async fn record_pending_reference(&self, order_id: i64, gateway_ref: &str) -> Result<(), StorefrontError>;

    /// Atomically allocate up to `order.quantity` unused codes for the order's product and, in the same
    /// transaction, mark the order `paid` with the gateway reference and a `payment_completed` event. See
    /// [`AllocationOutcome`] for the three possible results.
    async fn fulfill_order(&self, order: &Order, gateway_ref: &str) -> Result<AllocationOutcome, StorefrontError>;

    /// Append an event to the order's audit trail (delivery bookkeeping: `codes_sent`, `email_error`, ...).
    async fn append_event(
        &self,
        order_id: i64,
        event_type: OrderEventType,
        payload: Value,
    ) -> Result<(), StorefrontError>;

    async fn fetch_events_for_order(&self, order_id: i64) -> Result<Vec<OrderEvent>, StorefrontError>;

    async fn fetch_codes_for_order(&self, order_id: i64) -> Result<Vec<CouponCode>, StorefrontError>;

    /// Inventory intake: insert fresh unused codes for a product. Returns the number inserted.
    async fn insert_codes(&self, product_id: i64, codes: &[String]) -> Result<u64, StorefrontError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, StorefrontError>;
}
