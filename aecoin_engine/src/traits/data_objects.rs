use crate::db_types::{CouponCode, Order};

/// The result of the atomic code-allocation update for a successful payment confirmation.
#[derive(Debug, Clone)]
pub enum AllocationOutcome {
    /// Exactly `quantity` codes were bound to the order and the order is now `paid`.
    Fulfilled { order: Order, codes: Vec<CouponCode> },
    /// Fewer than `quantity` unused codes existed. Nothing was consumed; the order has been marked `failed` with the
    /// gateway reference recorded and a `codes_error` event appended.
    InsufficientCodes { order: Order, requested: i64, available: i64 },
    /// The order was no longer `pending` when the conditional status update ran. The allocation was rolled back.
    /// This is the authoritative guard against double fulfillment under concurrent webhook delivery.
    AlreadyProcessed,
}
