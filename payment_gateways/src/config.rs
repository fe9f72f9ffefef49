use std::env;

use aec_common::{helpers::is_credible_credential, Secret};
use log::*;

use crate::GatewayName;

const DEFAULT_TOYYIBPAY_API_URL: &str = "https://toyyibpay.com/index.php/api";
const DEFAULT_BILLPLZ_API_URL: &str = "https://www.billplz.com/api";
const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";

#[derive(Debug, Clone, Default)]
pub struct ToyyibPayConfig {
    pub api_url: String,
    pub secret_key: Secret<String>,
    pub category_code: String,
    pub callback_secret: Secret<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BillplzConfig {
    pub api_url: String,
    pub api_key: Secret<String>,
    pub collection_id: String,
    pub signature_key: Secret<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StripeConfig {
    pub api_url: String,
    pub secret_key: Secret<String>,
    pub webhook_secret: Secret<String>,
}

/// The set of gateways with usable credentials. A gateway is only present here if its credentials look credible (not
/// empty, not a sample placeholder); the selection policy falls back to the mock gateway when the whole set is empty.
#[derive(Debug, Clone, Default)]
pub struct GatewaysConfig {
    pub toyyibpay: Option<ToyyibPayConfig>,
    pub billplz: Option<BillplzConfig>,
    pub stripe: Option<StripeConfig>,
}

impl GatewaysConfig {
    pub fn from_env_or_default() -> Self {
        let toyyibpay = ToyyibPayConfig::try_from_env();
        let billplz = BillplzConfig::try_from_env();
        let stripe = StripeConfig::try_from_env();
        let configured = Self { toyyibpay, billplz, stripe };
        if configured.configured_names().is_empty() {
            warn!(
                "🛒️ No payment gateway credentials are configured. Checkouts will use the mock gateway and serve a \
                 local confirmation link instead of redirecting to a payment provider."
            );
        }
        configured
    }

    /// The names of all configured gateways, in the fixed fallback priority order.
    pub fn configured_names(&self) -> Vec<GatewayName> {
        let mut names = Vec::with_capacity(3);
        if self.toyyibpay.is_some() {
            names.push(GatewayName::ToyyibPay);
        }
        if self.billplz.is_some() {
            names.push(GatewayName::Billplz);
        }
        if self.stripe.is_some() {
            names.push(GatewayName::Stripe);
        }
        names
    }
}

impl ToyyibPayConfig {
    pub fn try_from_env() -> Option<Self> {
        let secret_key = env::var("AEC_TOYYIBPAY_SECRET_KEY").ok()?;
        let category_code = env::var("AEC_TOYYIBPAY_CATEGORY_CODE").ok()?;
        if !is_credible_credential(&secret_key) || !is_credible_credential(&category_code) {
            info!("🛒️ ToyyibPay credentials look like placeholders. Treating ToyyibPay as unconfigured.");
            return None;
        }
        let api_url = env::var("AEC_TOYYIBPAY_API_URL").unwrap_or_else(|_| DEFAULT_TOYYIBPAY_API_URL.to_string());
        let callback_secret = env::var("AEC_TOYYIBPAY_CALLBACK_SECRET").unwrap_or_default();
        Some(Self {
            api_url,
            secret_key: Secret::new(secret_key),
            category_code,
            callback_secret: Secret::new(callback_secret),
        })
    }
}

impl BillplzConfig {
    pub fn try_from_env() -> Option<Self> {
        let api_key = env::var("AEC_BILLPLZ_API_KEY").ok()?;
        let collection_id = env::var("AEC_BILLPLZ_COLLECTION_ID").ok()?;
        if !is_credible_credential(&api_key) || !is_credible_credential(&collection_id) {
            info!("🛒️ Billplz credentials look like placeholders. Treating Billplz as unconfigured.");
            return None;
        }
        let api_url = env::var("AEC_BILLPLZ_API_URL").unwrap_or_else(|_| DEFAULT_BILLPLZ_API_URL.to_string());
        let signature_key = env::var("AEC_BILLPLZ_SIGNATURE_KEY").unwrap_or_default();
        Some(Self {
            api_url,
            api_key: Secret::new(api_key),
            collection_id,
            signature_key: Secret::new(signature_key),
        })
    }
}

impl StripeConfig {
    pub fn try_from_env() -> Option<Self> {
        let secret_key = env::var("AEC_STRIPE_SECRET_KEY").ok()?;
        if !is_credible_credential(&secret_key) {
            info!("🛒️ Stripe credentials look like placeholders. Treating Stripe as unconfigured.");
            return None;
        }
        let api_url = env::var("AEC_STRIPE_API_URL").unwrap_or_else(|_| DEFAULT_STRIPE_API_URL.to_string());
        let webhook_secret = env::var("AEC_STRIPE_WEBHOOK_SECRET").unwrap_or_default();
        Some(Self {
            api_url,
            secret_key: Secret::new(secret_key),
            webhook_secret: Secret::new(webhook_secret),
        })
    }
}
