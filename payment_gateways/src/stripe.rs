//! Stripe hosted-checkout gateway client.
//!
//! A checkout session is created per order; the session id is the bill reference. Webhook events are authenticated
//! with the `Stripe-Signature` header scheme: `t=<timestamp>,v1=<hmac>` where the HMAC-SHA256 input is
//! `"{timestamp}.{raw body}"`.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use log::*;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    data_objects::{Bill, BillRequest},
    signatures::{hmac_sha256_hex, signatures_match},
    GatewayError,
    StripeConfig,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Events older than this are rejected to limit replay of captured payloads.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Clone)]
pub struct Stripe {
    config: StripeConfig,
    client: Arc<Client>,
}

#[derive(Debug, Deserialize)]
struct CreateSessionResponse {
    id: String,
    url: String,
}

impl Stripe {
    pub fn new(config: StripeConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn create_bill(&self, req: &BillRequest) -> Result<Bill, GatewayError> {
        let amount = req.amount.value().to_string();
        let form: Vec<(&str, &str)> = vec![
            ("mode", "payment"),
            ("success_url", &req.return_url),
            ("cancel_url", &req.return_url),
            ("customer_email", &req.email),
            ("line_items[0][quantity]", "1"),
            ("line_items[0][price_data][currency]", "myr"),
            ("line_items[0][price_data][unit_amount]", &amount),
            ("line_items[0][price_data][product_data][name]", &req.description),
            ("metadata[order_number]", &req.order_number),
        ];
        let url = format!("{}/v1/checkout/sessions", self.config.api_url);
        trace!("🛒️ Creating Stripe checkout session for order {}", req.order_number);
        let response =
            self.client.post(&url).bearer_auth(self.config.secret_key.reveal()).form(&form).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::UpstreamError { status, message });
        }
        let body: CreateSessionResponse =
            response.json().await.map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        debug!("🛒️ Stripe session {} created for order {}", body.id, req.order_number);
        Ok(Bill { reference: body.id, payment_url: body.url })
    }

    /// Verify the `Stripe-Signature` header for a raw webhook body. Fails closed whenever a webhook secret is
    /// configured; skips the check (with a trace entry) when it is not.
    pub fn verify_webhook(&self, body: &[u8], signature_header: Option<&str>) -> Result<(), GatewayError> {
        let secret = self.config.webhook_secret.reveal();
        if secret.is_empty() {
            trace!("🛒️ No Stripe webhook secret configured. Skipping signature check.");
            return Ok(());
        }
        let header = signature_header.ok_or(GatewayError::InvalidSignature)?;
        let (timestamp, supplied) = parse_signature_header(header).ok_or(GatewayError::InvalidSignature)?;
        if (Utc::now().timestamp() - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
            warn!("🛒️ Stripe webhook signature timestamp is outside the tolerance window.");
            return Err(GatewayError::InvalidSignature);
        }
        let mut payload = timestamp.to_string().into_bytes();
        payload.push(b'.');
        payload.extend_from_slice(body);
        let expected = hmac_sha256_hex(secret, &payload);
        if signatures_match(&expected, supplied) {
            Ok(())
        } else {
            Err(GatewayError::InvalidSignature)
        }
    }
}

/// Extract the `t` and first `v1` components of a `Stripe-Signature` header.
fn parse_signature_header(header: &str) -> Option<(i64, &str)> {
    let mut timestamp = None;
    let mut v1 = None;
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", t)) => timestamp = t.parse::<i64>().ok(),
            Some(("v1", sig)) if v1.is_none() => v1 = Some(sig),
            _ => {},
        }
    }
    Some((timestamp?, v1?))
}
