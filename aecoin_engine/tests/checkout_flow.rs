use chrono::Duration;
use aecoin_engine::{
    api::objects::{CartLine, CheckoutRequest},
    db_types::OrderStatus,
    test_utils::{prepare_test_env, seed_product},
    traits::StorefrontDatabase,
    CheckoutApi,
    CheckoutError,
    SqliteDatabase,
};

fn checkout_request(email: &str, product_id: i64, quantity: i64) -> CheckoutRequest {
    CheckoutRequest {
        email: email.to_string(),
        items: vec![CartLine { product_id, quantity }],
        terms_accepted: true,
        payment_method: None,
    }
}

#[tokio::test]
async fn checkout_creates_a_pending_order() {
    let url = "sqlite://../data/test_checkout_pending.db";
    prepare_test_env(url).await;
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating database");
    let product = seed_product(&db, "ae-1000", 6500, 10).await;
    let api = CheckoutApi::new(db);

    let order = api.process_checkout(checkout_request("buyer@example.com", product.id, 2)).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.quantity, 2);
    assert_eq!(order.subtotal, product.price_now * 2);
    assert!(order.order_number.as_str().starts_with("AE-"));
    assert!(order.gateway.is_none());

    let events = api.db().fetch_events_for_order(order.id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type.to_string(), "created");
}

#[tokio::test]
async fn payment_initiated_records_the_bill() {
    let url = "sqlite://../data/test_checkout_bill.db";
    prepare_test_env(url).await;
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating database");
    let product = seed_product(&db, "ae-500", 3300, 5).await;
    let api = CheckoutApi::new(db);

    let order = api.process_checkout(checkout_request("buyer@example.com", product.id, 1)).await.unwrap();
    let order = api.payment_initiated(order.id, "tb-abc123", "https://toyyibpay.com/tb-abc123", "toyyibpay").await.unwrap();
    assert_eq!(order.gateway_bill_code.as_deref(), Some("tb-abc123"));
    assert_eq!(order.gateway.as_deref(), Some("toyyibpay"));
    assert_eq!(order.status, OrderStatus::Pending);

    let events = api.db().fetch_events_for_order(order.id).await.unwrap();
    let kinds = events.iter().map(|e| e.event_type.to_string()).collect::<Vec<_>>();
    assert_eq!(kinds, vec!["created", "payment_initiated"]);
}

#[tokio::test]
async fn checkout_rejects_unknown_products() {
    let url = "sqlite://../data/test_checkout_unknown_product.db";
    prepare_test_env(url).await;
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating database");
    let api = CheckoutApi::new(db);

    let err = api.process_checkout(checkout_request("buyer@example.com", 999, 1)).await.unwrap_err();
    assert!(matches!(err, CheckoutError::ProductNotFound(999)));
}

#[tokio::test]
async fn checkout_rejects_orders_exceeding_stock() {
    let url = "sqlite://../data/test_checkout_stock.db";
    prepare_test_env(url).await;
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating database");
    let product = seed_product(&db, "ae-300", 2000, 1).await;
    let api = CheckoutApi::new(db);

    let err = api.process_checkout(checkout_request("buyer@example.com", product.id, 2)).await.unwrap_err();
    assert!(matches!(err, CheckoutError::InsufficientStock { requested: 2, available: 1 }));
}

#[tokio::test]
async fn subtotal_is_frozen_at_checkout_time() {
    let url = "sqlite://../data/test_checkout_price_freeze.db";
    prepare_test_env(url).await;
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating database");
    let product = seed_product(&db, "ae-1000", 6500, 5).await;
    let api = CheckoutApi::new(db);

    let order = api.process_checkout(checkout_request("buyer@example.com", product.id, 1)).await.unwrap();
    // A price change after checkout must not affect the stored order.
    sqlx::query("UPDATE products SET price_now = 9900 WHERE id = $1")
        .bind(product.id)
        .execute(api.db().pool())
        .await
        .unwrap();
    let stored = api.db().fetch_order_by_number(&order.order_number).await.unwrap().unwrap();
    assert_eq!(stored.subtotal, product.price_now);
}

#[tokio::test]
async fn sixth_attempt_within_the_window_is_rate_limited() {
    let url = "sqlite://../data/test_checkout_rate_limit.db";
    prepare_test_env(url).await;
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating database");
    let product = seed_product(&db, "ae-500", 3300, 100).await;
    let api = CheckoutApi::new(db).with_rate_limit(5, Duration::seconds(3600));

    for _ in 0..5 {
        api.process_checkout(checkout_request("spender@example.com", product.id, 1)).await.unwrap();
    }
    let err = api.process_checkout(checkout_request("spender@example.com", product.id, 1)).await.unwrap_err();
    assert!(matches!(err, CheckoutError::RateLimited));
    // The limit is per email, so another shopper is unaffected.
    api.process_checkout(checkout_request("other@example.com", product.id, 1)).await.unwrap();
}

#[tokio::test]
async fn rate_limit_window_resets() {
    let url = "sqlite://../data/test_checkout_rate_window.db";
    prepare_test_env(url).await;
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating database");
    let product = seed_product(&db, "ae-300", 2000, 100).await;
    let api = CheckoutApi::new(db).with_rate_limit(1, Duration::seconds(2));

    api.process_checkout(checkout_request("spender@example.com", product.id, 1)).await.unwrap();
    let err = api.process_checkout(checkout_request("spender@example.com", product.id, 1)).await.unwrap_err();
    assert!(matches!(err, CheckoutError::RateLimited));

    tokio::time::sleep(std::time::Duration::from_millis(2200)).await;
    api.process_checkout(checkout_request("spender@example.com", product.id, 1)).await.unwrap();
}
