//! The no-op test gateway.
//!
//! Used whenever no real gateway has credible credentials. It performs no network call: the "payment URL" points at
//! a local confirmation page so that the full order flow can be exercised against the test confirmation endpoint.

use log::*;

use crate::{
    data_objects::{Bill, BillRequest},
    GatewayError,
};

#[derive(Debug, Clone)]
pub struct MockGateway {
    app_url: String,
}

impl MockGateway {
    pub fn new(app_url: &str) -> Self {
        Self { app_url: app_url.trim_end_matches('/').to_string() }
    }

    pub fn create_bill(&self, req: &BillRequest) -> Result<Bill, GatewayError> {
        let reference = format!("mock-{}", req.order_number);
        let payment_url = format!("{}/mock-pay?order={}", self.app_url, req.order_number);
        info!("🛒️ Mock gateway issued bill {reference}; confirmation is driven locally.");
        Ok(Bill { reference, payment_url })
    }
}
