//! Error types for Satchel.

use thiserror::Error;

/// Primary error type for all client operations.
///
/// Non-401 HTTP statuses are deliberately *not* represented here: the
/// client hands those responses back untouched and the caller interprets
/// them. Only transport failures and the auth protocol produce errors.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Session expired; log in again")]
    SessionExpired,

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Credential storage error: {0}")]
    Store(#[from] crate::auth::StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Wrap a transport failure with hints about the usual causes.
    pub(crate) fn network(source: reqwest::Error, base_url: &str) -> Self {
        Self::Network {
            message: format!(
                "request to {base_url} failed: {source}. Check that the API \
                 server is running, that the base URL is correct, and that it \
                 allows cross-origin requests"
            ),
            source: Some(source),
        }
    }

    /// Create an API error for a rejected non-request call (login, etc.).
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether the caller should treat this as "user must log in again".
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ClientError>;
