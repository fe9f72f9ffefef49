use std::{fmt::Display, str::FromStr};

use aec_common::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

//--------------------------------------     GatewayName     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayName {
    ToyyibPay,
    Billplz,
    Stripe,
    Mock,
}

impl Display for GatewayName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayName::ToyyibPay => write!(f, "toyyibpay"),
            GatewayName::Billplz => write!(f, "billplz"),
            GatewayName::Stripe => write!(f, "stripe"),
            GatewayName::Mock => write!(f, "mock"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Unknown payment gateway: {0}")]
pub struct UnknownGateway(String);

impl FromStr for GatewayName {
    type Err = UnknownGateway;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "toyyibpay" => Ok(Self::ToyyibPay),
            "billplz" => Ok(Self::Billplz),
            "stripe" => Ok(Self::Stripe),
            "mock" => Ok(Self::Mock),
            other => Err(UnknownGateway(other.to_string())),
        }
    }
}

//--------------------------------------      BillRequest     --------------------------------------------------------
/// The gateway-agnostic description of a payable bill. The checkout flow builds one of these per order and hands it
/// to whichever gateway the selection policy picked.
#[derive(Debug, Clone)]
pub struct BillRequest {
    pub order_number: String,
    pub email: String,
    pub description: String,
    pub amount: Money,
    pub return_url: String,
    pub callback_url: String,
}

//--------------------------------------         Bill         --------------------------------------------------------
/// A gateway-specific payable artifact. `reference` is the provider's identifier for the bill or session and is
/// stored on the order so that webhook notifications can be matched back to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub reference: String,
    pub payment_url: String,
}
