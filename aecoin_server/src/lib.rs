//! # AECOIN storefront server
//! This crate hosts the HTTP front end for the AECOIN storefront. It is responsible for:
//! * accepting checkout requests and creating payment bills with the configured gateway,
//! * serving order-status lookups,
//! * listening for payment webhooks from ToyyibPay, Billplz and Stripe and driving fulfillment,
//! * delivering allocated codes by email.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config] for more information.
//!
//! ## Routes
//! * `/health`: a health check route that returns a 200 OK response.
//! * `/api/checkout`: creates an order and a payment bill.
//! * `/api/order/{order_number}`: order status, including codes once the order is paid.
//! * `/webhook/toyyibpay`, `/webhook/billplz`, `/webhook/stripe`: payment notifications.
//! * `/api/checkout/confirm`: confirmation endpoint for the mock gateway.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;
pub mod webhook_routes;

#[cfg(test)]
mod endpoint_tests;
