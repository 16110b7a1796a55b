// Error handling types for the client

use reqwest::StatusCode;
use thiserror::Error;

use super::validation::ValidationResult;

/// Client error types
///
/// Every fallible operation in the crate returns this type. Server responses
/// are surfaced verbatim: the status code and raw body travel with the error.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: StatusCode, body: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Maps a non-2xx response onto the error taxonomy
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let body = body.trim().to_string();
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(if body.is_empty() {
                "invalid or expired credentials".to_string()
            } else {
                body
            }),
            StatusCode::NOT_FOUND => ClientError::NotFound(if body.is_empty() {
                "resource not found".to_string()
            } else {
                body
            }),
            _ => ClientError::Api { status, body },
        }
    }

    /// HTTP status carried by the error, when it came from a server response
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            ClientError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            ClientError::Network(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    /// Message suitable for showing to the person at the keyboard
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ClientError::Api { status, body } if body.is_empty() => {
                format!("Request failed with status {}", status)
            }
            ClientError::Api { status, body } => {
                format!("Request failed with status {}: {}", status, body)
            }
            ClientError::Unauthorized(msg) => {
                format!("Authentication failed: {}. Please log in again.", msg)
            }
            ClientError::NotFound(msg) => format!("Not found: {}", msg),
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Config(msg) => msg.clone(),
            ClientError::Storage(e) => format!("Could not access the session file: {}", e),
            ClientError::Decode(_) => "The server sent a response we could not read.".to_string(),
        }
    }
}

/// Collapses a failed ValidationResult into a single error
impl From<ValidationResult> for ClientError {
    fn from(result: ValidationResult) -> Self {
        let error_messages: Vec<String> = result
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        ClientError::Validation(error_messages.join(", "))
    }
}
