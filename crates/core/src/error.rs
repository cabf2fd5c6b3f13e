//! Error types for the Laozihao domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for Laozihao operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- I/O (listener bind, serve loop) ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Classified failures of an upstream chat completion call.
///
/// The `Display` text is surfaced verbatim to HTTP clients, so each variant
/// reads as a complete, human-facing sentence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Chat provider is not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid API key, check the DEEPSEEK_API_KEY setting")]
    AuthenticationFailed,

    #[error("Too many requests to the chat provider, please try again later")]
    RateLimited,

    #[error("Chat provider is temporarily unavailable (status {status_code}), please try again later")]
    Unavailable { status_code: u16 },

    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Request timed out after {timeout_secs}s, please try again later")]
    Timeout { timeout_secs: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Chat provider returned an unexpected response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Map an upstream non-success status to its error class.
    ///
    /// `message` is the upstream-provided error text, used only for the
    /// generic class.
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        match status_code {
            401 => Self::AuthenticationFailed,
            429 => Self::RateLimited,
            500..=599 => Self::Unavailable { status_code },
            _ => Self::ApiError {
                status_code,
                message: message.into(),
            },
        }
    }
}

/// Failures reading the on-disk record collections.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(
            ProviderError::from_status(401, "nope"),
            ProviderError::AuthenticationFailed
        );
        assert_eq!(ProviderError::from_status(429, ""), ProviderError::RateLimited);
        assert_eq!(
            ProviderError::from_status(503, ""),
            ProviderError::Unavailable { status_code: 503 }
        );
        assert_eq!(
            ProviderError::from_status(400, "bad model"),
            ProviderError::ApiError {
                status_code: 400,
                message: "bad model".into()
            }
        );
    }

    #[test]
    fn api_error_displays_upstream_message() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 422,
            message: "Model not exist".into(),
        });
        assert!(err.to_string().contains("422"));
        assert!(err.to_string().contains("Model not exist"));
    }

    #[test]
    fn store_error_names_the_file() {
        let err = StoreError::Parse {
            path: PathBuf::from("data/brands.json"),
            reason: "expected value".into(),
        };
        assert!(err.to_string().contains("brands.json"));
    }
}
