//! Error types for provider operations.

use thiserror::Error;

/// Errors that can occur talking to the external call provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider does not know the requested call.
    #[error("Call not found: {0}")]
    NotFound(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Provider returned an error response (4xx, 5xx).
    #[error("Provider error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Provider response doesn't match any known envelope shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing credentials or base URL.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// True for "the call does not exist" class failures, which listings
    /// downgrade to a per-item deleted marker.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProviderError::NotFound(_) | ProviderError::Upstream { status: 404, .. }
        )
    }
}
