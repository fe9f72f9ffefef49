use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use aec_common::Money;
use chrono::{TimeZone, Utc};
use aecoin_engine::db_types::{Order, OrderNumber, OrderStatus, Product};

pub async fn get_request(path: &str, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let req = TestRequest::get().uri(path).to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let (_, res) = test::call_service(&service, req).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub async fn post_json(path: &str, body: serde_json::Value, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let req = TestRequest::post().uri(path).set_json(body).to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let (_, res) = test::call_service(&service, req).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub fn sample_product() -> Product {
    Product {
        id: 1,
        sku: "ae-1000".to_string(),
        title: "AECOIN 1000".to_string(),
        amount_ae: 1000,
        price_original: Money::from(7000),
        price_now: Money::from(6500),
        is_active: true,
        created_at: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
    }
}

pub fn sample_order(status: OrderStatus) -> Order {
    Order {
        id: 42,
        order_number: OrderNumber("AE-00C0FFEE-1234".to_string()),
        email: "buyer@example.com".to_string(),
        product_id: 1,
        quantity: 2,
        subtotal: Money::from(13_000),
        gateway: None,
        status,
        gateway_ref: None,
        gateway_bill_code: None,
        payment_url: None,
        paid_at: None,
        created_at: Utc.with_ymd_and_hms(2025, 6, 2, 10, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2025, 6, 2, 10, 30, 0).unwrap(),
    }
}
