//! Backend behaviour required by the engine APIs.
//!
//! The engine is generic over these traits so the HTTP layer can be tested against mocks and so that another storage
//! backend could be slotted in without touching the orchestration logic.

mod data_objects;
mod errors;
mod rate_limiter;
mod storefront_database;

pub use data_objects::AllocationOutcome;
pub use errors::StorefrontError;
pub use rate_limiter::RateLimiterStore;
pub use storefront_database::StorefrontDatabase;
