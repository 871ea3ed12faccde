use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every remote or local failure the client surfaces, in one tagged shape.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ClientError {
    /// Transport-level failure with no HTTP status (connect refused,
    /// malformed success body, upload failure).
    #[error("network failure: {message}")]
    Network { message: String },
    /// Non-2xx response; message comes from the body's `error` field when
    /// one is present.
    #[error("{message}")]
    Api { code: u16, message: String },
    /// Raised locally before any network call.
    #[error("{message}")]
    Validation { message: String },
}

impl ClientError {
    pub fn network(message: impl Into<String>) -> Self {
        ClientError::Network {
            message: message.into(),
        }
    }

    pub fn api(code: u16, message: impl Into<String>) -> Self {
        ClientError::Api {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation {
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Login interprets this as "no such account" and redirects to signup.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
