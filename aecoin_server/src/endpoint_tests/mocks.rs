use chrono::Duration;
use mockall::mock;
use serde_json::Value;
use aecoin_engine::{
    db_types::{CouponCode, NewOrder, NewProduct, Order, OrderEvent, OrderEventType, OrderNumber, Product},
    traits::{AllocationOutcome, RateLimiterStore, StorefrontDatabase, StorefrontError},
};

mock! {
    pub Storefront {}
    impl StorefrontDatabase for Storefront {
        fn url(&self) -> &str;
        async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, StorefrontError>;
        async fn fetch_active_product(&self, product_id: i64) -> Result<Option<Product>, StorefrontError>;
        async fn available_stock(&self, product_id: i64) -> Result<i64, StorefrontError>;
        async fn insert_order(&self, order: NewOrder, event_payload: Value) -> Result<Order, StorefrontError>;
        async fn fetch_order_by_reference(&self, reference: &str) -> Result<Option<Order>, StorefrontError>;
        async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, StorefrontError>;
        async fn set_payment_details(&self, order_id: i64, bill_code: &str, payment_url: &str, gateway: &str) -> Result<Order, StorefrontError>;
        async fn mark_order_failed(&self, order_id: i64, gateway_ref: Option<String>, payload: Value) -> Result<Option<Order>, StorefrontError>;
        async fn record_pending_reference(&self, order_id: i64, gateway_ref: &str) -> Result<(), StorefrontError>;
        async fn fulfill_order(&self, order: &Order, gateway_ref: &str) -> Result<AllocationOutcome, StorefrontError>;
        async fn append_event(&self, order_id: i64, event_type: OrderEventType, payload: Value) -> Result<(), StorefrontError>;
        async fn fetch_events_for_order(&self, order_id: i64) -> Result<Vec<OrderEvent>, StorefrontError>;
        async fn fetch_codes_for_order(&self, order_id: i64) -> Result<Vec<CouponCode>, StorefrontError>;
        async fn insert_codes(&self, product_id: i64, codes: &[String]) -> Result<u64, StorefrontError>;
        async fn insert_product(&self, product: NewProduct) -> Result<Product, StorefrontError>;
    }
    impl RateLimiterStore for Storefront {
        async fn increment(&self, key: &str, window: Duration) -> Result<u64, StorefrontError>;
    }
}
