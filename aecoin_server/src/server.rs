use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use payment_gateways::Gateways;
use aecoin_engine::{CheckoutApi, FulfillmentApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::resend::MailSender,
    routes::{health, CheckoutRoute, OrderStatusRoute},
    webhook_routes::{BillplzWebhookRoute, ConfirmMockPaymentRoute, StripeWebhookRoute, ToyyibpayWebhookRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let gateways = Gateways::from_config(&config.gateways, &config.app_url)
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let mailer = MailSender::from_config(config.email.as_ref())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let checkout_api = CheckoutApi::new(db.clone());
        let fulfillment_api = FulfillmentApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("aec::access_log"))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(fulfillment_api))
            .app_data(web::Data::new(gateways.clone()))
            .app_data(web::Data::new(mailer.clone()))
            .app_data(web::Data::new(config.clone()));
        let api_scope = web::scope("/api")
            .service(CheckoutRoute::<SqliteDatabase>::new())
            .service(OrderStatusRoute::<SqliteDatabase>::new())
            .service(ConfirmMockPaymentRoute::<SqliteDatabase>::new());
        let webhook_scope = web::scope("/webhook")
            .service(ToyyibpayWebhookRoute::<SqliteDatabase>::new())
            .service(BillplzWebhookRoute::<SqliteDatabase>::new())
            .service(StripeWebhookRoute::<SqliteDatabase>::new());
        app.service(health).service(api_scope).service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
