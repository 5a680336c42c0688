//! Error types for the dashboard client
//!
//! Uses thiserror for ergonomic error definitions.
//! Expected failures (network, server, validation) are values, never panics.

use thiserror::Error;

use crate::validation::FieldError;

/// Custom Result type using our Error
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Dashboard client errors
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// No response reached the client (connect, timeout, IO)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Server answered with an error status
    #[error("API error: HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Api { status: u16, message: Option<String> },

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request parameters failed the gateway shape checks
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Action attempted on a torn-down dashboard
    #[error("Dashboard is not mounted")]
    Unmounted,

    /// Form input failed client-side validation
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl MonitorError {
    /// True when no HTTP response was received
    pub fn is_transport(&self) -> bool {
        matches!(self, MonitorError::Transport(_))
    }

    /// Message carried by the server's error payload, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            MonitorError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// User-facing text: the fallback, plus the server's message when present
    pub fn user_message(&self, fallback: &str) -> String {
        match self.server_message() {
            Some(msg) => format!("{fallback}: {msg}"),
            None => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return MonitorError::Api {
                status: status.as_u16(),
                message: None,
            };
        }
        MonitorError::Transport(err.to_string())
    }
}
