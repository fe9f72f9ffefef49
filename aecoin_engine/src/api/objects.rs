use serde::{Deserialize, Serialize};

use crate::db_types::{CouponCode, Order};

//--------------------------------------    CheckoutRequest   --------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub email: String,
    pub items: Vec<CartLine>,
    pub terms_accepted: bool,
    /// The shopper's preferred payment method, if any. The realized gateway may differ (selection policy).
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i64,
}

//--------------------------------------  PaymentConfirmation --------------------------------------------------------
/// The gateway-agnostic content of one inbound payment notification, after the per-gateway route has authenticated
/// and decoded the provider's native encoding.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub gateway: String,
    /// The provider's bill/session reference, used as the primary lookup key.
    pub bill_code: Option<String>,
    /// The order number, used as the fallback lookup key.
    pub order_number: Option<String>,
    pub outcome: PaymentOutcome,
    /// The provider's transaction id for a completed payment.
    pub gateway_ref: Option<String>,
    /// The decoded notification, stored verbatim in the order-event payload.
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Success,
    Pending,
    Failed,
}

//--------------------------------------  ConfirmationResult --------------------------------------------------------
/// What the fulfillment state machine did with a confirmation. Webhook routes acknowledge all of these with a
/// 200-class response; only the `Fulfilled` arm triggers delivery.
#[derive(Debug, Clone)]
pub enum ConfirmationResult {
    /// No order matched the notification. Acknowledged to suppress upstream retries; no state was changed.
    UnknownOrder,
    /// The order is already `paid` with a gateway reference. Nothing was done.
    AlreadyProcessed,
    /// Codes were allocated and the order is `paid`. Delivery should be attempted with these codes.
    Fulfilled { order: Order, codes: Vec<CouponCode>, product_title: String },
    /// The code pool could not cover the order. The order is now `failed`; no codes were consumed.
    OutOfStock { order: Order },
    /// The provider reported the payment as still pending. The gateway reference was recorded.
    StillPending { order: Order },
    /// The provider reported failure/cancellation. The order is now `failed`.
    MarkedFailed { order: Order },
}
