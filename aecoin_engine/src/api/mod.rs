pub mod checkout_api;
pub mod errors;
pub mod fulfillment_api;
pub mod objects;
