use std::{fmt::Display, str::FromStr};

use aec_common::Money;
use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------       Product       ---------------------------------------------------------
/// A purchasable AECOIN package. Immutable for the purposes of the fulfillment core; `price_now` is read once at
/// checkout time and frozen into the order.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub title: String,
    /// The amount of in-game currency granted by one code of this product.
    pub amount_ae: i64,
    pub price_original: Money,
    pub price_now: Money,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub sku: String,
    pub title: String,
    pub amount_ae: i64,
    pub price_original: Money,
    pub price_now: Money,
    pub is_active: bool,
}

//--------------------------------------     CouponCode      ---------------------------------------------------------
/// A unique redeemable code. A code transitions `unused → used` exactly once; once used it is permanently bound to
/// one order and the purchaser's email.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CouponCode {
    pub id: i64,
    pub code: String,
    pub product_id: i64,
    pub is_used: bool,
    pub used_by_email: Option<String>,
    pub order_id: Option<i64>,
    pub reserved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------     OrderStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// The order exists and a payment may still arrive.
    Pending,
    /// Payment confirmed and codes allocated. Terminal.
    Paid,
    /// Payment failed, was cancelled, or allocation fell short. Terminal.
    Failed,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Paid => write!(f, "paid"),
            OrderStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status in database: {value}. Defaulting to pending.");
            OrderStatus::Pending
        })
    }
}

//--------------------------------------     OrderNumber     ---------------------------------------------------------
/// The human-facing order reference. Generated independently of the database's own identifier sequence and used as
/// the external reference with payment gateways.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderNumber(pub String);

impl FromStr for OrderNumber {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: OrderNumber,
    pub email: String,
    pub product_id: i64,
    pub quantity: i64,
    /// Frozen at creation; never recomputed even if the product price changes afterwards.
    pub subtotal: Money,
    /// The realized gateway. `None` until a bill has been created; may differ from the shopper's requested method.
    pub gateway: Option<String>,
    pub status: OrderStatus,
    /// The provider's transaction identifier. Together with a `paid` status this forms the idempotency gate.
    pub gateway_ref: Option<String>,
    pub gateway_bill_code: Option<String>,
    pub payment_url: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder      ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: OrderNumber,
    pub email: String,
    pub product_id: i64,
    pub quantity: i64,
    pub subtotal: Money,
}

//--------------------------------------    OrderEventType   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderEventType {
    Created,
    PaymentInitiated,
    PaymentCompleted,
    PaymentFailed,
    CodesSent,
    CodesError,
    EmailError,
}

impl Display for OrderEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderEventType::Created => write!(f, "created"),
            OrderEventType::PaymentInitiated => write!(f, "payment_initiated"),
            OrderEventType::PaymentCompleted => write!(f, "payment_completed"),
            OrderEventType::PaymentFailed => write!(f, "payment_failed"),
            OrderEventType::CodesSent => write!(f, "codes_sent"),
            OrderEventType::CodesError => write!(f, "codes_error"),
            OrderEventType::EmailError => write!(f, "email_error"),
        }
    }
}

//--------------------------------------      OrderEvent     ---------------------------------------------------------
/// One entry in an order's append-only audit trail. Events are never mutated or deleted; their insertion order is
/// the temporal order of the fulfillment pipeline.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderEvent {
    pub id: i64,
    pub order_id: i64,
    pub event_type: OrderEventType,
    pub payload: Option<String>,
    pub created_at: DateTime<Utc>,
}
