//! Payment gateway clients for the AECOIN storefront.
//!
//! Every supported payment provider exposes the same capability: create a payable bill for an order, and verify the
//! authenticity of an inbound payment notification. Concrete providers are wrapped in the [`Gateway`] enum so that
//! the checkout flow can treat them interchangeably, and [`select_gateways`] implements the configuration-driven
//! selection and fallback policy as a pure function.

mod billplz;
mod config;
mod data_objects;
mod error;
mod gateway;
mod mock;
mod selection;
mod stripe;
mod toyyibpay;

pub mod signatures;

pub use billplz::Billplz;
pub use config::{BillplzConfig, GatewaysConfig, StripeConfig, ToyyibPayConfig};
pub use data_objects::{Bill, BillRequest, GatewayName, UnknownGateway};
pub use error::GatewayError;
pub use gateway::{Gateway, Gateways};
pub use mock::MockGateway;
pub use selection::select_gateways;
pub use stripe::Stripe;
pub use toyyibpay::ToyyibPay;
