//----------------------------------------------   Payment webhooks  ----------------------------------------------
//! Webhook handlers for inbound payment notifications.
//!
//! Every handler follows the same shape: authenticate the notification (signature check with the gateway's secret),
//! decode it into a [`PaymentConfirmation`], hand it to the fulfillment state machine, and dispatch codes if the
//! order was fulfilled. A notification that fails authentication is rejected; once authenticated, the response is
//! always in the 200 range so the provider does not keep retrying notifications we have already acted on.

use actix_web::{web, HttpRequest, HttpResponse};
use log::*;
use payment_gateways::Gateways;
use aecoin_engine::{
    traits::StorefrontDatabase,
    ConfirmationResult,
    FulfillmentApi,
    PaymentConfirmation,
    PaymentOutcome,
};
use serde_json::json;

use crate::{
    data_objects::{BillplzCallback, ConfirmRequest, JsonResponse, ToyyibPayCallback},
    errors::ServerError,
    integrations::resend::MailSender,
    route,
};

//----------------------------------------------   ToyyibPay  ----------------------------------------------------
route!(toyyibpay_webhook => Post "/toyyibpay" impl StorefrontDatabase);
pub async fn toyyibpay_webhook<B>(
    body: web::Form<ToyyibPayCallback>,
    api: web::Data<FulfillmentApi<B>>,
    gateways: web::Data<Gateways>,
    mailer: web::Data<MailSender>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
{
    let callback = body.into_inner();
    trace!("🛒️ ToyyibPay callback for bill {}", callback.billcode);
    let Some(gateway) = gateways.toyyibpay() else {
        warn!("🛒️ Received a ToyyibPay callback but ToyyibPay is not configured. Ignoring.");
        return Ok(HttpResponse::Ok().json(JsonResponse::failure("ToyyibPay is not configured")));
    };
    let order_number = callback.order_id.clone().unwrap_or_default();
    if let Err(e) =
        gateway.verify_callback(&callback.billcode, &order_number, &callback.status_id, callback.signature.as_deref())
    {
        warn!("🛒️ ToyyibPay callback for bill {} failed verification: {e}", callback.billcode);
        return Ok(HttpResponse::Unauthorized().json(JsonResponse::failure("Invalid signature")));
    }
    let outcome = match callback.status_id.as_str() {
        "1" => PaymentOutcome::Success,
        "2" => PaymentOutcome::Pending,
        "3" => PaymentOutcome::Failed,
        other => {
            warn!("🛒️ Unknown ToyyibPay status id {other} for bill {}. Ignoring.", callback.billcode);
            return Ok(HttpResponse::Ok().json(JsonResponse::failure("Unknown status id")));
        },
    };
    let confirmation = PaymentConfirmation {
        gateway: "toyyibpay".to_string(),
        bill_code: Some(callback.billcode.clone()),
        order_number: callback.order_id.clone(),
        outcome,
        gateway_ref: callback.transaction_id.clone(),
        payload: json!({
            "billcode": callback.billcode,
            "order_id": callback.order_id,
            "status_id": callback.status_id,
            "transaction_id": callback.transaction_id,
        }),
    };
    // Authenticated notifications are always acked, even when processing fails internally (retry-storm avoidance).
    match api.handle_confirmation(confirmation).await {
        Ok(result) => dispatch_fulfillment(result, &api, &mailer).await,
        Err(e) => error!("🛒️ Could not process ToyyibPay callback for bill {}: {e}", callback.billcode),
    }
    Ok(HttpResponse::Ok().json(JsonResponse::success("OK")))
}

//----------------------------------------------   Billplz  ----------------------------------------------------
route!(billplz_webhook => Post "/billplz" impl StorefrontDatabase);
/// Billplz signs the whole form (sorted `key|value` pairs), so the handler keeps the raw body and decodes it twice:
/// once into pairs for the signature check, once into the fields it cares about.
pub async fn billplz_webhook<B>(
    body: web::Bytes,
    api: web::Data<FulfillmentApi<B>>,
    gateways: web::Data<Gateways>,
    mailer: web::Data<MailSender>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
{
    let Some(gateway) = gateways.billplz() else {
        warn!("🛒️ Received a Billplz callback but Billplz is not configured. Ignoring.");
        return Ok(HttpResponse::Ok().json(JsonResponse::failure("Billplz is not configured")));
    };
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(&body)
        .map_err(|e| ServerError::InvalidRequestBody(format!("Malformed Billplz callback: {e}")))?;
    let signature = pairs.iter().find(|(k, _)| k == "x_signature").map(|(_, v)| v.as_str());
    if let Err(e) = gateway.verify_callback(&pairs, signature) {
        warn!("🛒️ Billplz callback failed verification: {e}");
        return Ok(HttpResponse::Unauthorized().json(JsonResponse::failure("Invalid signature")));
    }
    let callback: BillplzCallback = match serde_urlencoded::from_bytes(&body) {
        Ok(callback) => callback,
        Err(e) => {
            error!("🛒️ Billplz callback passed the signature check but could not be decoded: {e}");
            return Ok(HttpResponse::Ok().json(JsonResponse::failure("Malformed callback")));
        },
    };
    trace!("🛒️ Billplz callback for bill {}", callback.id);
    // Billplz bills do not expire into a callback; anything unpaid is still collectible.
    let outcome = if callback.paid == "true" { PaymentOutcome::Success } else { PaymentOutcome::Pending };
    let confirmation = PaymentConfirmation {
        gateway: "billplz".to_string(),
        bill_code: Some(callback.id.clone()),
        order_number: callback.reference_1.clone(),
        outcome,
        gateway_ref: callback.transaction_id.clone(),
        payload: json!({
            "id": callback.id,
            "paid": callback.paid,
            "state": callback.state,
            "transaction_id": callback.transaction_id,
            "reference_1": callback.reference_1,
        }),
    };
    match api.handle_confirmation(confirmation).await {
        Ok(result) => dispatch_fulfillment(result, &api, &mailer).await,
        Err(e) => error!("🛒️ Could not process Billplz callback for bill {}: {e}", callback.id),
    }
    Ok(HttpResponse::Ok().json(JsonResponse::success("OK")))
}

//----------------------------------------------   Stripe  ----------------------------------------------------
route!(stripe_webhook => Post "/stripe" impl StorefrontDatabase);
/// Stripe signs the raw request body with the endpoint's webhook secret, so the body must be verified before any
/// JSON parsing happens.
pub async fn stripe_webhook<B>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<FulfillmentApi<B>>,
    gateways: web::Data<Gateways>,
    mailer: web::Data<MailSender>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
{
    let Some(gateway) = gateways.stripe() else {
        warn!("🛒️ Received a Stripe event but Stripe is not configured. Ignoring.");
        return Ok(HttpResponse::Ok().json(JsonResponse::failure("Stripe is not configured")));
    };
    let signature = req.headers().get("Stripe-Signature").and_then(|v| v.to_str().ok());
    if let Err(e) = gateway.verify_webhook(&body, signature) {
        warn!("🛒️ Stripe event failed verification: {e}");
        return Ok(HttpResponse::Unauthorized().json(JsonResponse::failure("Invalid signature")));
    }
    let event: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            error!("🛒️ Stripe event passed the signature check but could not be decoded: {e}");
            return Ok(HttpResponse::Ok().json(JsonResponse::failure("Malformed event")));
        },
    };
    let event_type = event["type"].as_str().unwrap_or_default().to_string();
    let outcome = match event_type.as_str() {
        "checkout.session.completed" => PaymentOutcome::Success,
        "checkout.session.expired" => PaymentOutcome::Failed,
        other => {
            debug!("🛒️ Ignoring Stripe event type {other}");
            return Ok(HttpResponse::Ok().json(JsonResponse::success("Ignored")));
        },
    };
    let session = &event["data"]["object"];
    let session_id = session["id"].as_str().map(String::from);
    let order_number = session["metadata"]["order_number"].as_str().map(String::from);
    let gateway_ref = session["payment_intent"].as_str().map(String::from).or_else(|| session_id.clone());
    trace!("🛒️ Stripe {event_type} for session {session_id:?}");
    let confirmation = PaymentConfirmation {
        gateway: "stripe".to_string(),
        bill_code: session_id,
        order_number,
        outcome,
        gateway_ref,
        payload: event,
    };
    match api.handle_confirmation(confirmation).await {
        Ok(result) => dispatch_fulfillment(result, &api, &mailer).await,
        Err(e) => error!("🛒️ Could not process Stripe {event_type} event: {e}"),
    }
    Ok(HttpResponse::Ok().json(JsonResponse::success("OK")))
}

//----------------------------------------------   Mock confirm  ----------------------------------------------------
route!(confirm_mock_payment => Post "/checkout/confirm" impl StorefrontDatabase);
/// Confirmation endpoint for the mock gateway. It only acts on orders that were billed against the mock gateway, so
/// a deployment with real gateways configured cannot have orders confirmed through it.
pub async fn confirm_mock_payment<B>(
    body: web::Json<ConfirmRequest>,
    api: web::Data<FulfillmentApi<B>>,
    mailer: web::Data<MailSender>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
{
    let request = body.into_inner();
    let order = api
        .db()
        .fetch_order_by_reference(&request.order_number)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {} does not exist", request.order_number)))?;
    if order.gateway.as_deref() != Some("mock") {
        warn!("🛒️ Refusing to mock-confirm order {}: it is billed via a real gateway.", order.order_number);
        return Ok(HttpResponse::Forbidden().json(JsonResponse::failure("Order is not payable via the mock gateway")));
    }
    let outcome = match request.status.as_deref() {
        None | Some("paid") | Some("success") => PaymentOutcome::Success,
        Some("pending") => PaymentOutcome::Pending,
        Some("failed") | Some("cancelled") => PaymentOutcome::Failed,
        Some(other) => {
            return Ok(HttpResponse::BadRequest().json(JsonResponse::failure(format!("Unknown status: {other}"))));
        },
    };
    let confirmation = PaymentConfirmation {
        gateway: "mock".to_string(),
        bill_code: order.gateway_bill_code.clone(),
        order_number: Some(order.order_number.to_string()),
        outcome,
        gateway_ref: Some(format!("mock-txn-{}", order.order_number)),
        payload: json!({ "confirmed_via": "mock endpoint", "status": request.status }),
    };
    let result = api.handle_confirmation(confirmation).await?;
    let response = match &result {
        ConfirmationResult::Fulfilled { .. } => JsonResponse::success("Payment confirmed and codes allocated"),
        ConfirmationResult::AlreadyProcessed => JsonResponse::success("Order was already processed"),
        ConfirmationResult::OutOfStock { .. } => JsonResponse::failure("Order failed: not enough codes in stock"),
        ConfirmationResult::StillPending { .. } => JsonResponse::success("Order left pending"),
        ConfirmationResult::MarkedFailed { .. } => JsonResponse::success("Order marked failed"),
        ConfirmationResult::UnknownOrder => JsonResponse::failure("Order not found"),
    };
    dispatch_fulfillment(result, &api, &mailer).await;
    Ok(HttpResponse::Ok().json(response))
}

/// Send allocated codes to the purchaser and record the delivery outcome on the order's event log. Delivery problems
/// never bubble up to the webhook response: the payment has already been accepted.
pub async fn dispatch_fulfillment<B>(result: ConfirmationResult, api: &FulfillmentApi<B>, mailer: &MailSender)
where
    B: StorefrontDatabase,
{
    let ConfirmationResult::Fulfilled { order, codes, product_title } = result else {
        return;
    };
    let code_strings = codes.into_iter().map(|c| c.code).collect::<Vec<_>>();
    let delivery =
        mailer.send_codes(&order.email, order.order_number.as_str(), &product_title, &code_strings).await;
    let record = match delivery {
        Ok(()) => {
            info!("📧️ Codes for order {} dispatched to {}", order.order_number, order.email);
            api.record_delivery(order.id, Some(&code_strings), None).await
        },
        Err(e) => {
            error!(
                "📧️ Could not deliver codes for order {}: {e}. The codes remain allocated; resend manually.",
                order.order_number
            );
            api.record_delivery(order.id, None, Some(&e.to_string())).await
        },
    };
    if let Err(e) = record {
        error!("🗃️ Could not record the delivery outcome for order {}: {e}", order.order_number);
    }
}
