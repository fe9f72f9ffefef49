//! ToyyibPay FPX/card gateway client.
//!
//! Bills are created with a form-encoded `createBill` call. The API responds with a one-element JSON array carrying
//! the `BillCode`; anything else is an upstream failure and the message is surfaced in the error.

use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    data_objects::{Bill, BillRequest},
    signatures::{hmac_sha256_hex, signatures_match},
    GatewayError,
    ToyyibPayConfig,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct ToyyibPay {
    config: ToyyibPayConfig,
    client: Arc<Client>,
}

#[derive(Debug, Deserialize)]
struct CreateBillResponse {
    #[serde(rename = "BillCode")]
    bill_code: Option<String>,
    msg: Option<String>,
}

impl ToyyibPay {
    pub fn new(config: ToyyibPayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn create_bill(&self, req: &BillRequest) -> Result<Bill, GatewayError> {
        let amount = req.amount.value().to_string();
        let form: Vec<(&str, &str)> = vec![
            ("userSecretKey", self.config.secret_key.reveal()),
            ("categoryCode", &self.config.category_code),
            ("billName", "AECOIN Purchase"),
            ("billDescription", &req.description),
            // 1 = fixed price, 1 = payor email is mandatory, '2' = both FPX and credit card channels
            ("billPriceSetting", "1"),
            ("billPayorInfo", "1"),
            ("billPaymentChannel", "2"),
            ("billAmount", &amount),
            ("billReturnUrl", &req.return_url),
            ("billCallbackUrl", &req.callback_url),
            ("billExternalReferenceNo", &req.order_number),
            ("billTo", &req.email),
            ("billEmail", &req.email),
        ];
        let url = format!("{}/createBill", self.config.api_url);
        trace!("🛒️ Creating ToyyibPay bill for order {}", req.order_number);
        let response = self.client.post(&url).form(&form).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::UpstreamError { status, message });
        }
        let body: Vec<CreateBillResponse> =
            response.json().await.map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        match body.first() {
            Some(CreateBillResponse { bill_code: Some(code), .. }) => {
                debug!("🛒️ ToyyibPay bill {code} created for order {}", req.order_number);
                Ok(Bill { reference: code.clone(), payment_url: format!("https://toyyibpay.com/{code}") })
            },
            Some(CreateBillResponse { msg: Some(msg), .. }) => {
                Err(GatewayError::UpstreamError { status: 200, message: msg.clone() })
            },
            _ => Err(GatewayError::InvalidResponse("createBill response carried no BillCode".to_string())),
        }
    }

    /// Verify an inbound callback. ToyyibPay signs `billcode|order_id|status_id` with the callback secret. When no
    /// secret is configured the check is skipped; when one is configured a missing or wrong signature fails closed.
    pub fn verify_callback(
        &self,
        bill_code: &str,
        order_number: &str,
        status_id: &str,
        signature: Option<&str>,
    ) -> Result<(), GatewayError> {
        let secret = self.config.callback_secret.reveal();
        if secret.is_empty() {
            trace!("🛒️ No ToyyibPay callback secret configured. Skipping signature check.");
            return Ok(());
        }
        let payload = format!("{bill_code}|{order_number}|{status_id}");
        let expected = hmac_sha256_hex(secret, payload.as_bytes());
        match signature {
            Some(sig) if signatures_match(&expected, sig) => Ok(()),
            _ => Err(GatewayError::InvalidSignature),
        }
    }
}
