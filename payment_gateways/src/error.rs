use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Could not initialize gateway client: {0}")]
    Initialization(String),
    #[error("Gateway request failed: {0}")]
    RequestError(String),
    #[error("Gateway call timed out: {0}")]
    Timeout(String),
    #[error("Gateway returned an error. Status {status}. {message}")]
    UpstreamError { status: u16, message: String },
    #[error("Could not interpret gateway response: {0}")]
    InvalidResponse(String),
    #[error("Notification signature is invalid")]
    InvalidSignature,
    #[error("No payment gateway is available to serve this request")]
    NoGatewayAvailable,
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout(e.to_string())
        } else {
            GatewayError::RequestError(e.to_string())
        }
    }
}
