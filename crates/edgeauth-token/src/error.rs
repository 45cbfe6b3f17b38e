//! Error types for the token crate.

use thiserror::Error;

/// Errors that can occur while assembling or signing a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// A setter was called without a value. The builder is left untouched.
    #[error("invalid argument: {argument} must be provided")]
    InvalidArgument { argument: &'static str },

    /// The signer was invoked without one of its credentials.
    #[error("missing signing credential: {field}")]
    MissingCredential { field: &'static str },

    /// Failed to compute the keyed digest.
    #[error("failed to sign token: {0}")]
    SigningFailed(String),

    /// Failed to serialize the claim set.
    #[error("claim serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
