use std::fmt::Debug;

use log::*;
use serde_json::json;

use crate::{
    api::{
        errors::FulfillmentError,
        objects::{ConfirmationResult, PaymentConfirmation, PaymentOutcome},
    },
    db_types::{Order, OrderEventType, OrderStatus},
    traits::{AllocationOutcome, StorefrontDatabase},
};

/// `FulfillmentApi` is the webhook-side state machine: it resolves the order a notification refers to, applies the
/// idempotency gate, and drives the atomic code allocation for successful payments.
pub struct FulfillmentApi<B> {
    db: B,
}

impl<B> Debug for FulfillmentApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FulfillmentApi")
    }
}

impl<B> FulfillmentApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> FulfillmentApi<B>
where B: StorefrontDatabase
{
    /// Process one authenticated payment notification.
    ///
    /// The status check here is a fast-path short circuit only. The authoritative protection against double
    /// allocation is inside [`StorefrontDatabase::fulfill_order`], whose conditional update can only ever move an
    /// order out of `pending` once.
    pub async fn handle_confirmation(
        &self,
        conf: PaymentConfirmation,
    ) -> Result<ConfirmationResult, FulfillmentError> {
        let order = match self.resolve_order(&conf).await? {
            Some(order) => order,
            None => {
                warn!(
                    "📦️ No order found for {} notification (bill: {:?}, order: {:?}). Acknowledging to suppress \
                     retries.",
                    conf.gateway, conf.bill_code, conf.order_number
                );
                return Ok(ConfirmationResult::UnknownOrder);
            },
        };
        if order.status == OrderStatus::Paid && order.gateway_ref.is_some() {
            info!("📦️ Order {} is already processed. Nothing to do.", order.order_number);
            return Ok(ConfirmationResult::AlreadyProcessed);
        }
        match conf.outcome {
            PaymentOutcome::Success => self.fulfill(order, &conf).await,
            PaymentOutcome::Pending => {
                if let Some(gw_ref) = conf.gateway_ref.as_deref() {
                    self.db.record_pending_reference(order.id, gw_ref).await?;
                }
                debug!("📦️ Payment for order {} is still pending.", order.order_number);
                Ok(ConfirmationResult::StillPending { order })
            },
            PaymentOutcome::Failed => {
                match self.db.mark_order_failed(order.id, conf.gateway_ref.clone(), conf.payload.clone()).await? {
                    Some(order) => {
                        info!("📦️ Payment for order {} failed or was cancelled.", order.order_number);
                        Ok(ConfirmationResult::MarkedFailed { order })
                    },
                    None => {
                        info!(
                            "📦️ Order {} was already settled when a failure notification arrived. Ignoring it.",
                            order.order_number
                        );
                        Ok(ConfirmationResult::AlreadyProcessed)
                    },
                }
            },
        }
    }

    /// Append the delivery outcome to the order's event log. A delivery failure never rolls back payment state: the
    /// codes stay allocated and the order stays `paid`.
    pub async fn record_delivery(
        &self,
        order_id: i64,
        delivered_codes: Option<&[String]>,
        error: Option<&str>,
    ) -> Result<(), FulfillmentError> {
        match (delivered_codes, error) {
            (Some(codes), None) => {
                self.db.append_event(order_id, OrderEventType::CodesSent, json!({ "codes": codes })).await?
            },
            (_, Some(e)) => self.db.append_event(order_id, OrderEventType::EmailError, json!({ "error": e })).await?,
            (None, None) => {},
        }
        Ok(())
    }

    async fn resolve_order(&self, conf: &PaymentConfirmation) -> Result<Option<Order>, FulfillmentError> {
        if let Some(bill_code) = conf.bill_code.as_deref() {
            if let Some(order) = self.db.fetch_order_by_reference(bill_code).await? {
                return Ok(Some(order));
            }
        }
        if let Some(number) = conf.order_number.as_deref() {
            if let Some(order) = self.db.fetch_order_by_reference(number).await? {
                return Ok(Some(order));
            }
        }
        Ok(None)
    }

    async fn fulfill(
        &self,
        order: Order,
        conf: &PaymentConfirmation,
    ) -> Result<ConfirmationResult, FulfillmentError> {
        let gateway_ref = conf.gateway_ref.as_deref().unwrap_or("unknown");
        match self.db.fulfill_order(&order, gateway_ref).await? {
            AllocationOutcome::Fulfilled { order, codes } => {
                info!("📦️ Order {} fulfilled: {} codes allocated.", order.order_number, codes.len());
                let product_title = self
                    .db
                    .fetch_product(order.product_id)
                    .await?
                    .map(|p| p.title)
                    .unwrap_or_else(|| "AECOIN Package".to_string());
                Ok(ConfirmationResult::Fulfilled { order, codes, product_title })
            },
            AllocationOutcome::InsufficientCodes { order, requested, available } => {
                error!(
                    "📦️ Order {} could not be fulfilled: {available} of {requested} codes available. Order marked \
                     failed; no codes were consumed.",
                    order.order_number
                );
                Ok(ConfirmationResult::OutOfStock { order })
            },
            AllocationOutcome::AlreadyProcessed => {
                info!("📦️ Order {} was fulfilled by a concurrent confirmation.", order.order_number);
                Ok(ConfirmationResult::AlreadyProcessed)
            },
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
