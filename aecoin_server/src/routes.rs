//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause
//! the current worker to stop processing new requests. For this reason, any long, non-cpu-bound operation (e.g. I/O,
//! database operations, etc.) should be expressed as futures or asynchronous functions.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use payment_gateways::{BillRequest, GatewayName, Gateways};
use aecoin_engine::{
    api::objects::CheckoutRequest,
    db_types::{OrderNumber, OrderStatus},
    traits::{RateLimiterStore, StorefrontDatabase},
    CheckoutApi,
};

use crate::{
    config::ServerConfig,
    data_objects::{CheckoutResponse, OrderStatusResponse, SuccessResponse},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:tt)+) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $($bounds)+ + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl StorefrontDatabase + RateLimiterStore);
/// Route handler for the checkout endpoint.
///
/// Validates and prices the cart, stores a `pending` order, and then walks the gateway candidates in priority order
/// until one of them produces a payable bill. If every candidate fails, the order is marked failed and the shopper
/// gets a 500: there is nothing they can do differently, and the audit trail records the attempt.
pub async fn checkout<B>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B>>,
    gateways: web::Data<Gateways>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase + RateLimiterStore,
{
    let req = body.into_inner();
    let requested = req.payment_method.as_deref().and_then(|s| s.parse::<GatewayName>().ok());
    let order = api.process_checkout(req).await?;
    let product = api
        .db()
        .fetch_product(order.product_id)
        .await?
        .ok_or_else(|| ServerError::BackendError(format!("Product {} vanished mid-checkout", order.product_id)))?;
    let bill_request = BillRequest {
        order_number: order.order_number.to_string(),
        email: order.email.clone(),
        description: format!("{} x {}", order.quantity, product.title),
        amount: order.subtotal,
        return_url: format!("{}/order/{}", config.app_url, order.order_number),
        callback_url: String::new(),
    };
    let mut last_error = None;
    for gateway in gateways.for_checkout(requested) {
        let name = gateway.name();
        let mut bill_request = bill_request.clone();
        bill_request.callback_url = format!("{}/webhook/{name}", config.app_url);
        match gateway.create_bill(&bill_request).await {
            Ok(bill) => {
                let order =
                    api.payment_initiated(order.id, &bill.reference, &bill.payment_url, &name.to_string()).await?;
                info!("🛒️ Order {} billed via {name}. Redirecting shopper to payment.", order.order_number);
                let response = CheckoutResponse {
                    order_number: order.order_number.to_string(),
                    payment_url: bill.payment_url,
                    gateway: name.to_string(),
                    total: order.subtotal,
                };
                return Ok(HttpResponse::Ok().json(SuccessResponse::new(response)));
            },
            Err(e) => {
                warn!("🛒️ {name} could not create a bill for order {}: {e}", order.order_number);
                last_error = Some(e);
            },
        }
    }
    let reason = last_error.map(|e| e.to_string()).unwrap_or_else(|| "No payment gateway is available".to_string());
    api.checkout_gateway_failed(order.id, &reason).await?;
    Err(ServerError::PaymentUnavailable(reason))
}

//----------------------------------------------   Order status  ----------------------------------------------------
route!(order_status => Get "/order/{order_number}" impl StorefrontDatabase + RateLimiterStore);
/// Order status lookup. Codes are only included once the order is paid.
pub async fn order_status<B>(
    path: web::Path<String>,
    api: web::Data<CheckoutApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase + RateLimiterStore,
{
    let number = OrderNumber::from(path.into_inner());
    let order = api
        .order_by_number(&number)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {number} does not exist")))?;
    let codes = if order.status == OrderStatus::Paid {
        let codes = api.db().fetch_codes_for_order(order.id).await?;
        Some(codes.into_iter().map(|c| c.code).collect())
    } else {
        None
    };
    Ok(HttpResponse::Ok().json(OrderStatusResponse::from_order(order, codes)))
}
