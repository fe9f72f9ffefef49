use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use aecoin_engine::{traits::StorefrontError, CheckoutError, FulfillmentError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Checkout could not be completed. {0}")]
    CheckoutError(#[from] CheckoutError),
    #[error("Payment is currently unavailable. {0}")]
    PaymentUnavailable(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::CheckoutError(e) => match e {
                CheckoutError::ValidationError(_) => StatusCode::BAD_REQUEST,
                CheckoutError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                CheckoutError::ProductNotFound(_) => StatusCode::NOT_FOUND,
                CheckoutError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
                CheckoutError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::PaymentUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "success": false, "error": self.to_string() }).to_string())
    }
}

impl From<StorefrontError> for ServerError {
    fn from(e: StorefrontError) -> Self {
        Self::BackendError(e.to_string())
    }
}

impl From<FulfillmentError> for ServerError {
    fn from(e: FulfillmentError) -> Self {
        Self::BackendError(e.to_string())
    }
}
