//! Code delivery via the Resend transactional email API.
use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;

use crate::config::EmailConfig;

const RESEND_API_URL: &str = "https://api.resend.com/emails";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Could not initialize the mail client. {0}")]
    Initialization(String),
    #[error("Could not send email. {0}")]
    SendError(String),
    #[error("The mail API rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// The delivery channel for allocated codes. When no Resend key is configured the codes are logged so that a
/// development setup still completes the fulfillment loop.
#[derive(Clone)]
pub enum MailSender {
    Resend(ResendMailer),
    LogOnly,
}

impl MailSender {
    pub fn from_config(config: Option<&EmailConfig>) -> Result<Self, MailError> {
        match config {
            Some(cfg) => Ok(Self::Resend(ResendMailer::new(cfg.clone())?)),
            None => Ok(Self::LogOnly),
        }
    }

    pub async fn send_codes(
        &self,
        to: &str,
        order_number: &str,
        product_title: &str,
        codes: &[String],
    ) -> Result<(), MailError> {
        match self {
            Self::Resend(mailer) => mailer.send_codes(to, order_number, product_title, codes).await,
            Self::LogOnly => {
                info!("📧️ [log-only] Codes for order {order_number} ({product_title}) to {to}: {}", codes.join(", "));
                Ok(())
            },
        }
    }
}

#[derive(Clone)]
pub struct ResendMailer {
    config: EmailConfig,
    client: Arc<Client>,
}

impl ResendMailer {
    pub fn new(config: EmailConfig) -> Result<Self, MailError> {
        let client =
            Client::builder().timeout(REQUEST_TIMEOUT).build().map_err(|e| MailError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn send_codes(
        &self,
        to: &str,
        order_number: &str,
        product_title: &str,
        codes: &[String],
    ) -> Result<(), MailError> {
        let code_list = codes.iter().map(|c| format!("<li><code>{c}</code></li>")).collect::<String>();
        let html = format!(
            "<p>Thank you for your purchase of {product_title}.</p>\
             <p>Your order <strong>{order_number}</strong> is paid. Your codes:</p>\
             <ul>{code_list}</ul>\
             <p>Redeem them in-game under Settings &gt; Redeem Code.</p>"
        );
        let body = json!({
            "from": self.config.from,
            "to": [to],
            "subject": format!("Your AECOIN codes for order {order_number}"),
            "html": html,
        });
        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(self.config.api_key.reveal())
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::SendError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected { status, message });
        }
        debug!("📧️ Codes for order {order_number} emailed to {to}");
        Ok(())
    }
}
