//! The tagged-variant gateway capability and the configured-gateway registry.

use log::*;

use crate::{
    data_objects::{Bill, BillRequest, GatewayName},
    select_gateways,
    Billplz,
    GatewayError,
    GatewaysConfig,
    MockGateway,
    Stripe,
    ToyyibPay,
};

/// One concrete payment gateway. All variants provide the same capability: create a payable bill for an order.
/// Notification verification is gateway-specific (the encodings differ) and is exposed on the concrete clients.
#[derive(Clone)]
pub enum Gateway {
    ToyyibPay(ToyyibPay),
    Billplz(Billplz),
    Stripe(Stripe),
    Mock(MockGateway),
}

impl Gateway {
    pub fn name(&self) -> GatewayName {
        match self {
            Gateway::ToyyibPay(_) => GatewayName::ToyyibPay,
            Gateway::Billplz(_) => GatewayName::Billplz,
            Gateway::Stripe(_) => GatewayName::Stripe,
            Gateway::Mock(_) => GatewayName::Mock,
        }
    }

    pub async fn create_bill(&self, req: &BillRequest) -> Result<Bill, GatewayError> {
        match self {
            Gateway::ToyyibPay(gw) => gw.create_bill(req).await,
            Gateway::Billplz(gw) => gw.create_bill(req).await,
            Gateway::Stripe(gw) => gw.create_bill(req).await,
            Gateway::Mock(gw) => gw.create_bill(req),
        }
    }
}

/// All gateways built from the configuration, with the selection policy applied per checkout.
#[derive(Clone)]
pub struct Gateways {
    configured: Vec<Gateway>,
    mock: Gateway,
}

impl Gateways {
    pub fn from_config(config: &GatewaysConfig, app_url: &str) -> Result<Self, GatewayError> {
        let mut configured = Vec::with_capacity(3);
        if let Some(cfg) = &config.toyyibpay {
            configured.push(Gateway::ToyyibPay(ToyyibPay::new(cfg.clone())?));
        }
        if let Some(cfg) = &config.billplz {
            configured.push(Gateway::Billplz(Billplz::new(cfg.clone())?));
        }
        if let Some(cfg) = &config.stripe {
            configured.push(Gateway::Stripe(Stripe::new(cfg.clone())?));
        }
        let names = configured.iter().map(|g| g.name().to_string()).collect::<Vec<_>>().join(", ");
        info!("🛒️ Configured payment gateways: [{names}]");
        Ok(Self { configured, mock: Gateway::Mock(MockGateway::new(app_url)) })
    }

    /// The gateways to try for one checkout, in priority order. See [`select_gateways`].
    pub fn for_checkout(&self, requested: Option<GatewayName>) -> Vec<&Gateway> {
        let configured_names: Vec<GatewayName> = self.configured.iter().map(Gateway::name).collect();
        select_gateways(&configured_names, requested)
            .into_iter()
            .filter_map(|name| self.get(name))
            .collect()
    }

    pub fn get(&self, name: GatewayName) -> Option<&Gateway> {
        if name == GatewayName::Mock {
            return Some(&self.mock);
        }
        self.configured.iter().find(|g| g.name() == name)
    }

    pub fn toyyibpay(&self) -> Option<&ToyyibPay> {
        self.configured.iter().find_map(|g| match g {
            Gateway::ToyyibPay(gw) => Some(gw),
            _ => None,
        })
    }

    pub fn billplz(&self) -> Option<&Billplz> {
        self.configured.iter().find_map(|g| match g {
            Gateway::Billplz(gw) => Some(gw),
            _ => None,
        })
    }

    pub fn stripe(&self) -> Option<&Stripe> {
        self.configured.iter().find_map(|g| match g {
            Gateway::Stripe(gw) => Some(gw),
            _ => None,
        })
    }
}
