use std::fmt::Display;

use aec_common::Money;
use aecoin_engine::db_types::{Order, OrderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The success envelope every storefront endpoint wraps its payload in. Errors use the mirror-image shape
/// `{ "success": false, "error": ... }`, built in [`crate::errors::ServerError::error_response`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

/// What the storefront needs to send the shopper to the payment page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub order_number: String,
    pub payment_url: String,
    /// The realized gateway, which may differ from the one the shopper asked for.
    pub gateway: String,
    pub total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusResponse {
    pub order_number: String,
    pub status: OrderStatus,
    pub subtotal: Money,
    pub payment_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    /// Only present once the order is paid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codes: Option<Vec<String>>,
}

impl OrderStatusResponse {
    pub fn from_order(order: Order, codes: Option<Vec<String>>) -> Self {
        Self {
            order_number: order.order_number.to_string(),
            status: order.status,
            subtotal: order.subtotal,
            payment_url: order.payment_url,
            created_at: order.created_at,
            paid_at: order.paid_at,
            codes,
        }
    }
}

/// The form ToyyibPay posts to the callback URL. Field names follow the provider's convention.
#[derive(Debug, Clone, Deserialize)]
pub struct ToyyibPayCallback {
    pub billcode: String,
    /// The external reference number supplied at bill creation, i.e. our order number.
    pub order_id: Option<String>,
    /// 1 = success, 2 = pending, 3 = fail.
    pub status_id: String,
    pub transaction_id: Option<String>,
    pub signature: Option<String>,
}

/// The fields of interest in a Billplz callback. Signature verification runs over the raw form, not this struct.
#[derive(Debug, Clone, Deserialize)]
pub struct BillplzCallback {
    pub id: String,
    pub paid: String,
    pub state: Option<String>,
    pub transaction_id: Option<String>,
    pub reference_1: Option<String>,
}

/// Confirmation request for the mock gateway. Only orders billed against the mock gateway accept it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub order_number: String,
    /// `paid` (the default), `pending` or `failed`. Drives the same state machine a real webhook would.
    #[serde(default)]
    pub status: Option<String>,
}
