//! Error types for background removal operations

use thiserror::Error;

/// Result type alias for background removal operations
pub type Result<T> = std::result::Result<T, BgRemovalError>;

/// Fixed user-facing message for unreadable uploads
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load image. Please try another file.";

/// Fixed user-facing message for any remote removal failure
pub const REMOVAL_FAILED_MESSAGE: &str =
    "An error occurred while removing the background. Please try again.";

/// Error types for background removal operations
#[derive(Error, Debug)]
pub enum BgRemovalError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The uploaded resource could not be read as an image
    #[error("Decode error: {0}")]
    Decode(String),

    /// Network or service failure while calling the model endpoint
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The model endpoint responded, but without any inline image part
    #[error("No image data found in the model response")]
    NoImageInResponse,

    /// Invalid configuration or parameters (missing API key, bad model name)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BgRemovalError {
    /// Create a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new upstream error
    pub fn upstream<S: Into<String>>(msg: S) -> Self {
        Self::Upstream(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an upstream error carrying the HTTP status and response body excerpt
    pub fn upstream_status(status: u16, body: &str) -> Self {
        let excerpt: String = body.chars().take(200).collect();
        if excerpt.is_empty() {
            Self::Upstream(format!("model endpoint returned status {status}"))
        } else {
            Self::Upstream(format!(
                "model endpoint returned status {status}: {excerpt}"
            ))
        }
    }

    /// Map an error to the fixed message shown to the user.
    ///
    /// All remote failure kinds collapse to one generic message; only
    /// unreadable uploads get their own wording. The distinct kinds stay
    /// available for logging.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Decode(_) => LOAD_FAILED_MESSAGE,
            _ => REMOVAL_FAILED_MESSAGE,
        }
    }
}
