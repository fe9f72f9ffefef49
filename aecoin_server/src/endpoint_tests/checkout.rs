use actix_web::{http::StatusCode, web, web::ServiceConfig};
use payment_gateways::{Gateways, GatewaysConfig};
use serde_json::json;
use aecoin_engine::{db_types::OrderStatus, CheckoutApi};

use super::{
    helpers::{get_request, post_json, sample_order, sample_product},
    mocks::MockStorefront,
};
use crate::{
    config::ServerConfig,
    integrations::resend::MailSender,
    routes::{CheckoutRoute, OrderStatusRoute},
};

fn checkout_body() -> serde_json::Value {
    json!({
        "email": "buyer@example.com",
        "items": [{ "product_id": 1, "quantity": 2 }],
        "terms_accepted": true,
    })
}

fn register_common(cfg: &mut ServiceConfig, db: MockStorefront) {
    let config = ServerConfig::default();
    let gateways = Gateways::from_config(&GatewaysConfig::default(), &config.app_url).unwrap();
    cfg.service(CheckoutRoute::<MockStorefront>::new())
        .service(OrderStatusRoute::<MockStorefront>::new())
        .app_data(web::Data::new(CheckoutApi::new(db)))
        .app_data(web::Data::new(gateways))
        .app_data(web::Data::new(MailSender::LogOnly))
        .app_data(web::Data::new(config));
}

#[actix_web::test]
async fn checkout_happy_path_falls_back_to_the_mock_gateway() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_json("/checkout", checkout_body(), |cfg| {
        let mut db = MockStorefront::new();
        db.expect_increment().returning(|_, _| Ok(1));
        db.expect_fetch_active_product().returning(|_| Ok(Some(sample_product())));
        db.expect_available_stock().returning(|_| Ok(10));
        db.expect_insert_order().returning(|_, _| Ok(sample_order(OrderStatus::Pending)));
        db.expect_fetch_product().returning(|_| Ok(Some(sample_product())));
        db.expect_set_payment_details().returning(|_, bill_code, payment_url, gateway| {
            let mut order = sample_order(OrderStatus::Pending);
            order.gateway_bill_code = Some(bill_code.to_string());
            order.payment_url = Some(payment_url.to_string());
            order.gateway = Some(gateway.to_string());
            Ok(order)
        });
        register_common(cfg, db);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""success":true"#), "unexpected body: {body}");
    assert!(body.contains(r#""data""#), "unexpected body: {body}");
    assert!(body.contains("mock-pay"), "unexpected body: {body}");
    assert!(body.contains("AE-00C0FFEE-1234"));
}

#[actix_web::test]
async fn checkout_without_accepted_terms_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let mut body = checkout_body();
    body["terms_accepted"] = json!(false);
    let (status, body) = post_json("/checkout", body, |cfg| {
        register_common(cfg, MockStorefront::new());
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("terms"));
}

#[actix_web::test]
async fn checkout_over_the_rate_limit_is_rejected() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_json("/checkout", checkout_body(), |cfg| {
        let mut db = MockStorefront::new();
        db.expect_increment().returning(|_, _| Ok(6));
        register_common(cfg, db);
    })
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body.contains(r#""success":false"#), "unexpected body: {body}");
    assert!(body.contains(r#""error""#), "unexpected body: {body}");
    assert!(body.contains("Too many"));
}

#[actix_web::test]
async fn checkout_beyond_available_stock_is_rejected() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_json("/checkout", checkout_body(), |cfg| {
        let mut db = MockStorefront::new();
        db.expect_increment().returning(|_, _| Ok(1));
        db.expect_fetch_active_product().returning(|_| Ok(Some(sample_product())));
        db.expect_available_stock().returning(|_| Ok(1));
        register_common(cfg, db);
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Insufficient stock"), "unexpected body: {body}");
}

#[actix_web::test]
async fn order_status_includes_codes_once_paid() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/order/AE-00C0FFEE-1234", |cfg| {
        let mut db = MockStorefront::new();
        db.expect_fetch_order_by_number().returning(|_| {
            let mut order = sample_order(OrderStatus::Paid);
            order.gateway_ref = Some("txn-1".to_string());
            Ok(Some(order))
        });
        db.expect_fetch_codes_for_order().returning(|_| {
            let mut code = aecoin_engine::db_types::CouponCode {
                id: 7,
                code: "AE1000-CODE-0001".to_string(),
                product_id: 1,
                is_used: true,
                used_by_email: Some("buyer@example.com".to_string()),
                order_id: Some(42),
                reserved_at: None,
                created_at: chrono::Utc::now(),
            };
            code.reserved_at = Some(code.created_at);
            Ok(vec![code])
        });
        register_common(cfg, db);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""status":"paid""#), "unexpected body: {body}");
    assert!(body.contains("AE1000-CODE-0001"));
}

#[actix_web::test]
async fn order_status_for_unknown_orders_is_not_found() {
    let _ = env_logger::try_init().ok();
    let (status, _body) = get_request("/order/AE-DOESNOTEXIST-0000", |cfg| {
        let mut db = MockStorefront::new();
        db.expect_fetch_order_by_number().returning(|_| Ok(None));
        register_common(cfg, db);
    })
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
