use std::env;

use aec_common::{helpers::is_credible_credential, Secret};
use log::*;
use payment_gateways::GatewaysConfig;

const DEFAULT_AEC_HOST: &str = "127.0.0.1";
const DEFAULT_AEC_PORT: u16 = 8580;
const DEFAULT_APP_URL: &str = "http://localhost:8580";
const DEFAULT_EMAIL_FROM: &str = "AECOIN Store <store@aecoin.example>";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The public base URL of the storefront. Used to build gateway return/callback URLs and the mock gateway's
    /// confirmation link.
    pub app_url: String,
    pub gateways: GatewaysConfig,
    /// When absent (no credible Resend API key), allocated codes are logged instead of emailed.
    pub email: Option<EmailConfig>,
}

#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub api_key: Secret<String>,
    pub from: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_AEC_HOST.to_string(),
            port: DEFAULT_AEC_PORT,
            database_url: String::default(),
            app_url: DEFAULT_APP_URL.to_string(),
            gateways: GatewaysConfig::default(),
            email: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("AEC_HOST").ok().unwrap_or_else(|| DEFAULT_AEC_HOST.into());
        let port = env::var("AEC_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for AEC_PORT. {e} Using the default, {DEFAULT_AEC_PORT}, instead."
                    );
                    DEFAULT_AEC_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_AEC_PORT);
        let database_url = env::var("AEC_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ AEC_DATABASE_URL is not set. Please set it to the URL for the storefront database.");
            String::default()
        });
        let app_url = env::var("AEC_APP_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ AEC_APP_URL is not set. Using {DEFAULT_APP_URL}. Gateway callbacks will not reach a server \
                   that is not actually listening there.");
            DEFAULT_APP_URL.to_string()
        });
        let gateways = GatewaysConfig::from_env_or_default();
        let email = EmailConfig::try_from_env();
        if email.is_none() {
            warn!("🪛️ No credible Resend API key found in AEC_RESEND_API_KEY. Codes will be logged, not emailed.");
        }
        Self { host, port, database_url, app_url, gateways, email }
    }
}

impl EmailConfig {
    pub fn try_from_env() -> Option<Self> {
        let api_key = env::var("AEC_RESEND_API_KEY").ok()?;
        if !is_credible_credential(&api_key) {
            info!("🪛️ AEC_RESEND_API_KEY looks like a placeholder. Treating email as unconfigured.");
            return None;
        }
        let from = env::var("AEC_EMAIL_FROM").unwrap_or_else(|_| DEFAULT_EMAIL_FROM.to_string());
        Some(Self { api_key: Secret::new(api_key), from })
    }
}
