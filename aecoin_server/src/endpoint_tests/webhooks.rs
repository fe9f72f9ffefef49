use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use aec_common::Secret;
use chrono::Utc;
use payment_gateways::{signatures::hmac_sha256_hex, Gateways, GatewaysConfig, StripeConfig, ToyyibPayConfig};
use serde_json::json;
use aecoin_engine::{
    db_types::{CouponCode, OrderStatus},
    traits::{AllocationOutcome, StorefrontError},
    FulfillmentApi,
};

use super::{
    helpers::{post_json, sample_order, sample_product},
    mocks::MockStorefront,
};
use crate::{
    config::ServerConfig,
    integrations::resend::MailSender,
    webhook_routes::{ConfirmMockPaymentRoute, StripeWebhookRoute, ToyyibpayWebhookRoute},
};

fn register(cfg: &mut ServiceConfig, db: MockStorefront, gateways: Gateways) {
    cfg.service(ConfirmMockPaymentRoute::<MockStorefront>::new())
        .service(ToyyibpayWebhookRoute::<MockStorefront>::new())
        .service(StripeWebhookRoute::<MockStorefront>::new())
        .app_data(web::Data::new(FulfillmentApi::new(db)))
        .app_data(web::Data::new(gateways))
        .app_data(web::Data::new(MailSender::LogOnly))
        .app_data(web::Data::new(ServerConfig::default()));
}

fn mock_gateways() -> Gateways {
    Gateways::from_config(&GatewaysConfig::default(), "http://localhost:8580").unwrap()
}

fn mock_billed_order() -> aecoin_engine::db_types::Order {
    let mut order = sample_order(OrderStatus::Pending);
    order.gateway = Some("mock".to_string());
    order.gateway_bill_code = Some("mock-AE-00C0FFEE-1234".to_string());
    order
}

fn allocated_code(id: i64) -> CouponCode {
    CouponCode {
        id,
        code: format!("AE1000-CODE-{id:04}"),
        product_id: 1,
        is_used: true,
        used_by_email: Some("buyer@example.com".to_string()),
        order_id: Some(42),
        reserved_at: Some(Utc::now()),
        created_at: Utc::now(),
    }
}

#[actix_web::test]
async fn mock_confirmation_fulfills_the_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_json("/checkout/confirm", json!({ "order_number": "AE-00C0FFEE-1234" }), |cfg| {
        let mut db = MockStorefront::new();
        db.expect_fetch_order_by_reference().returning(|_| Ok(Some(mock_billed_order())));
        db.expect_fulfill_order().returning(|order, gateway_ref| {
            let mut paid = order.clone();
            paid.status = OrderStatus::Paid;
            paid.gateway_ref = Some(gateway_ref.to_string());
            Ok(AllocationOutcome::Fulfilled { order: paid, codes: vec![allocated_code(1), allocated_code(2)] })
        });
        db.expect_fetch_product().returning(|_| Ok(Some(sample_product())));
        db.expect_append_event()
            .withf(|_, event_type, _| event_type.to_string() == "codes_sent")
            .times(1)
            .returning(|_, _, _| Ok(()));
        register(cfg, db, mock_gateways());
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""success":true"#), "unexpected body: {body}");
}

#[actix_web::test]
async fn mock_confirmation_refuses_orders_billed_via_real_gateways() {
    let _ = env_logger::try_init().ok();
    let (status, _body) = post_json("/checkout/confirm", json!({ "order_number": "AE-00C0FFEE-1234" }), |cfg| {
        let mut db = MockStorefront::new();
        db.expect_fetch_order_by_reference().returning(|_| {
            let mut order = mock_billed_order();
            order.gateway = Some("toyyibpay".to_string());
            Ok(Some(order))
        });
        register(cfg, db, mock_gateways());
    })
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn toyyibpay_callbacks_are_ignored_when_unconfigured() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post()
        .uri("/toyyibpay")
        .set_form([
            ("billcode", "tb-123"),
            ("order_id", "AE-00C0FFEE-1234"),
            ("status_id", "1"),
        ])
        .to_request();
    let app = App::new().configure(|cfg| register(cfg, MockStorefront::new(), mock_gateways()));
    let service = test::init_service(app).await;
    let (_, res) = test::call_service(&service, req).await.into_parts();
    assert_eq!(res.status(), StatusCode::OK);
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    assert!(body.contains(r#""success":false"#), "unexpected body: {body}");
}

// Once a callback has passed the signature check the gateway must get a 200 back, even when our own processing
// blows up. A 5xx here would put the provider into a retry loop against an error that retrying cannot fix.
#[actix_web::test]
async fn authenticated_callbacks_are_acked_even_when_the_backend_fails() {
    let _ = env_logger::try_init().ok();
    let config = GatewaysConfig {
        toyyibpay: Some(ToyyibPayConfig {
            api_url: "https://toyyibpay.test/api".to_string(),
            secret_key: Secret::new("key".to_string()),
            category_code: "cat".to_string(),
            // No callback secret, so the signature check passes trivially.
            callback_secret: Secret::new(String::new()),
        }),
        ..Default::default()
    };
    let gateways = Gateways::from_config(&config, "http://localhost:8580").unwrap();
    let mut db = MockStorefront::new();
    db.expect_fetch_order_by_reference()
        .returning(|_| Err(StorefrontError::DatabaseError("database is locked".to_string())));
    let app = App::new().configure(move |cfg| register(cfg, db, gateways));
    let service = test::init_service(app).await;
    let req = TestRequest::post()
        .uri("/toyyibpay")
        .set_form([
            ("billcode", "tb-123"),
            ("order_id", "AE-00C0FFEE-1234"),
            ("status_id", "1"),
            ("transaction_id", "txn-1"),
        ])
        .to_request();
    let (_, res) = test::call_service(&service, req).await.into_parts();
    assert_eq!(res.status(), StatusCode::OK);
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    assert!(body.contains(r#""success":true"#), "unexpected body: {body}");
}

#[actix_web::test]
async fn stripe_events_of_no_interest_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let secret = "whsec_test";
    let body = json!({ "type": "invoice.paid", "data": { "object": {} } }).to_string();
    let timestamp = Utc::now().timestamp();
    let mut payload = timestamp.to_string().into_bytes();
    payload.push(b'.');
    payload.extend_from_slice(body.as_bytes());
    let header = format!("t={timestamp},v1={}", hmac_sha256_hex(secret, &payload));

    let config = GatewaysConfig {
        stripe: Some(StripeConfig {
            api_url: "https://stripe.test".to_string(),
            secret_key: Secret::new("sk_test_123".to_string()),
            webhook_secret: Secret::new(secret.to_string()),
        }),
        ..Default::default()
    };
    let gateways = Gateways::from_config(&config, "http://localhost:8580").unwrap();
    let app = App::new().configure(move |cfg| register(cfg, MockStorefront::new(), gateways));
    let service = test::init_service(app).await;

    let req = TestRequest::post()
        .uri("/stripe")
        .insert_header(("Stripe-Signature", header.clone()))
        .set_payload(body.clone())
        .to_request();
    let (_, res) = test::call_service(&service, req).await.into_parts();
    assert_eq!(res.status(), StatusCode::OK);

    // A tampered body no longer matches the signature.
    let req = TestRequest::post()
        .uri("/stripe")
        .insert_header(("Stripe-Signature", header))
        .set_payload(body.replace("invoice.paid", "checkout.session.completed"))
        .to_request();
    let (_, res) = test::call_service(&service, req).await.into_parts();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
