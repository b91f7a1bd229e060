//! Error types for the capability engine.

use crate::types::CapabilityKind;

/// Errors from capability resolution and handler execution.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),
    #[error("Invalid arguments for {capability}: {reason}")]
    InvalidArguments {
        capability: CapabilityKind,
        reason: String,
    },
    #[error("Capability not registered: {0}")]
    Unregistered(CapabilityKind),
    #[error("Handler for {handler} cannot execute a {requested} request")]
    Unsupported {
        handler: CapabilityKind,
        requested: CapabilityKind,
    },
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Errors from the email / calendar provider clients.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Http(err.to_string())
    }
}

/// Errors from the delegated-access credential store.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("credential file not found: {0}")]
    Missing(String),
    #[error("credential file is invalid: {0}")]
    Invalid(String),
    #[error("access token expired and no refresh token is available")]
    NoRefreshToken,
    #[error("token refresh failed: {0}")]
    Refresh(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
