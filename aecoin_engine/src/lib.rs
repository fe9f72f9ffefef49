//! AECOIN storefront engine
//!
//! The engine owns everything between an incoming checkout request and a fulfilled order: order records and their
//! append-only event log, the coupon-code inventory, the per-email checkout rate limit, and the webhook-driven
//! confirmation state machine. It is HTTP- and gateway-agnostic; the server crate layers the actix routes and the
//! payment-provider clients on top of it.
//!
//! The library is split into:
//! 1. Backend traits and the SQLite implementation ([`traits`], [`mod@sqlite`]). Low-level database access lives in
//!    free functions over `&mut SqliteConnection` so that callers can compose them inside transactions.
//! 2. The engine APIs ([`CheckoutApi`], [`FulfillmentApi`]): the checkout orchestrator and the payment-confirmation
//!    handler. These are generic over the backend traits so they can be exercised against mocks.

pub mod api;
pub mod db_types;
pub mod helpers;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use api::{
    checkout_api::CheckoutApi,
    errors::{CheckoutError, FulfillmentError},
    fulfillment_api::FulfillmentApi,
    objects::{CartLine, CheckoutRequest, ConfirmationResult, PaymentConfirmation, PaymentOutcome},
};
