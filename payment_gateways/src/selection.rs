//! Gateway selection policy.
//!
//! Selection is a pure function of configuration plus the caller's (optional) preference, so it can be tested without
//! any network access. The returned list is a priority order: the checkout flow walks it and uses the first gateway
//! whose bill creation succeeds, falling back to the next one on request-time failure.

use crate::GatewayName;

/// Produce the priority-ordered list of gateways for one checkout.
///
/// * If nothing is configured, the mock gateway is used unconditionally.
/// * A configured requested gateway is tried first, with the remaining configured gateways as fallbacks.
/// * An unconfigured (or absent) preference falls back to the configured gateways in their fixed priority order.
pub fn select_gateways(configured: &[GatewayName], requested: Option<GatewayName>) -> Vec<GatewayName> {
    if configured.is_empty() {
        return vec![GatewayName::Mock];
    }
    let mut order: Vec<GatewayName> = Vec::with_capacity(configured.len());
    if let Some(preferred) = requested {
        if configured.contains(&preferred) {
            order.push(preferred);
        }
    }
    for name in configured {
        if !order.contains(name) {
            order.push(*name);
        }
    }
    order
}
