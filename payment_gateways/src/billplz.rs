//! Billplz collection-bill gateway client.
//!
//! Bills are created under a pre-configured collection with HTTP basic auth (the API key is the username, the
//! password is empty). Callbacks carry an `x_signature` computed as HMAC-SHA256 over the pipe-joined `key` + `value`
//! pairs of the payload, sorted by key, excluding the signature itself.

use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    data_objects::{Bill, BillRequest},
    signatures::{hmac_sha256_hex, signatures_match},
    BillplzConfig,
    GatewayError,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct Billplz {
    config: BillplzConfig,
    client: Arc<Client>,
}

#[derive(Debug, Deserialize)]
struct CreateBillResponse {
    id: String,
    url: String,
}

impl Billplz {
    pub fn new(config: BillplzConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn create_bill(&self, req: &BillRequest) -> Result<Bill, GatewayError> {
        let amount = req.amount.value().to_string();
        let form: Vec<(&str, &str)> = vec![
            ("collection_id", &self.config.collection_id),
            ("email", &req.email),
            ("name", &req.email),
            ("amount", &amount),
            ("description", &req.description),
            ("callback_url", &req.callback_url),
            ("redirect_url", &req.return_url),
            ("reference_1_label", "Order"),
            ("reference_1", &req.order_number),
        ];
        let url = format!("{}/v3/bills", self.config.api_url);
        trace!("🛒️ Creating Billplz bill for order {}", req.order_number);
        let response = self
            .client
            .post(&url)
            .basic_auth(self.config.api_key.reveal(), None::<&str>)
            .form(&form)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::UpstreamError { status, message });
        }
        let body: CreateBillResponse =
            response.json().await.map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        debug!("🛒️ Billplz bill {} created for order {}", body.id, req.order_number);
        Ok(Bill { reference: body.id, payment_url: body.url })
    }

    /// Verify a callback's `x_signature` against the configured signature key. The source string is built from the
    /// payload's key/value pairs (signature excluded), sorted by key and joined with `|`.
    pub fn verify_callback(&self, pairs: &[(String, String)], signature: Option<&str>) -> Result<(), GatewayError> {
        let key = self.config.signature_key.reveal();
        if key.is_empty() {
            trace!("🛒️ No Billplz signature key configured. Skipping signature check.");
            return Ok(());
        }
        let expected = hmac_sha256_hex(key, signature_source(pairs).as_bytes());
        match signature {
            Some(sig) if signatures_match(&expected, sig) => Ok(()),
            _ => Err(GatewayError::InvalidSignature),
        }
    }
}

fn signature_source(pairs: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = pairs.iter().filter(|(k, _)| k != "x_signature").collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted.iter().map(|(k, v)| format!("{k}{v}")).collect::<Vec<_>>().join("|")
}
