//! Error handling

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::{error, info};

/// definitions for the quotecard application.
#[derive(Debug)]
pub enum QuoteCardError {
    /// When the caller didn't send what the endpoint needs
    BadRequest(&'static str),
    /// When a provider credential is not configured
    MissingCredential(&'static str),
    /// When the upstream provider answered with a non-success status
    Upstream {
        /// Status code forwarded to the client.
        status: StatusCode,
        /// Error message extracted from the upstream body.
        message: String,
    },
    /// Anything else that went wrong while proxying
    Internal {
        /// Generic message returned to the client.
        message: &'static str,
        /// What actually happened, for the logs.
        detail: String,
    },
}

impl QuoteCardError {
    /// Wraps an unexpected fault, keeping the client-facing message generic.
    pub fn internal(message: &'static str, detail: impl Into<String>) -> Self {
        QuoteCardError::Internal {
            message,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for QuoteCardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteCardError::BadRequest(message) => write!(f, "{message}"),
            QuoteCardError::MissingCredential(message) => write!(f, "{message}"),
            QuoteCardError::Upstream { status, message } => {
                write!(f, "Upstream error {status}: {message}")
            }
            QuoteCardError::Internal { message, detail } => {
                write!(f, "{message}: {detail}")
            }
        }
    }
}

impl std::error::Error for QuoteCardError {}

impl IntoResponse for QuoteCardError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            QuoteCardError::BadRequest(message) => {
                info!("Bad request received: {message}");
                (StatusCode::BAD_REQUEST, message.to_string())
            }
            QuoteCardError::MissingCredential(message) => {
                error!("Provider credential not configured: {message}");
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
            QuoteCardError::Upstream { status, message } => {
                error!("Upstream error {status}: {message}");
                (status, message)
            }
            QuoteCardError::Internal { message, detail } => {
                error!("Internal error: {detail}");
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
