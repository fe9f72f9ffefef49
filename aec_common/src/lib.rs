mod money;
mod secret;

pub mod helpers;

pub use money::{Money, MoneyConversionError, STORE_CURRENCY_CODE};
pub use secret::Secret;
