use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;

use crate::db_types::OrderNumber;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

/// Generate a fresh human-facing order number. The format is `AE-XXXXXXXX-NNNN` (8 random hex characters plus 4
/// random digits), which is easy to read out over support channels and collision-resistant enough for the unique
/// index on `orders.order_number` to be the final arbiter.
pub fn generate_order_number() -> OrderNumber {
    let mut rng = rand::thread_rng();
    let hex: u32 = rng.gen();
    let digits: u16 = rng.gen_range(0..10_000);
    OrderNumber(format!("AE-{hex:08X}-{digits:04}"))
}

/// A deliberately simple shape check: one `@`, no whitespace, and a dot somewhere in the domain. Anything stricter
/// belongs to the mail provider, which is the only party that can actually validate an address.
pub fn is_valid_email(email: &str) -> bool {
    let re = EMAIL_RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"));
    re.is_match(email)
}
