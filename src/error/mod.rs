//! Error types and handlers for credential synchronization

pub mod handlers;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

/// Failures turning a raw authorization token into a username/password pair
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("authorization token is not valid base64: {0}")]
    InvalidEncoding(String),
    /// Carries the decoded token text for diagnostics
    #[error("authorization token does not contain data in <user>:<password> format: {0}")]
    MalformedCredentialFormat(String),
}

/// Failures turning an endpoint or server address into a host string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("invalid registry endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// Token fetch from the registry provider failed
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),
    /// Listing or creating registries failed
    #[error("Registry directory error: {0}")]
    Directory(String),
    /// Listing, creating or updating credentials failed
    #[error("Credential store error: {0}")]
    CredentialStore(String),
    /// Matched registry does not have exactly one credential
    #[error("Registry {registry_id} has {count} credentials, expected exactly one")]
    AmbiguousCredentialState { registry_id: String, count: usize },
    /// Registry was created but its credential was not; the registry is left orphaned
    #[error("Registry {registry_id} was created but its credential was not: {reason}")]
    PartialCreateFailure { registry_id: String, reason: String },
    /// Invalid process configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl SyncError {
    /// Short machine-friendly label used in logs and report summaries
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Provider(_) => "provider",
            SyncError::Decode(_) => "decode",
            SyncError::Resolve(_) => "resolve",
            SyncError::Directory(_) => "directory",
            SyncError::CredentialStore(_) => "credential_store",
            SyncError::AmbiguousCredentialState { .. } => "ambiguous_credential_state",
            SyncError::PartialCreateFailure { .. } => "partial_create_failure",
            SyncError::Configuration(_) => "configuration",
            SyncError::Io(_) => "io",
        }
    }

    /// Whether an operator has to clean something up by hand
    pub fn needs_operator_attention(&self) -> bool {
        matches!(
            self,
            SyncError::AmbiguousCredentialState { .. } | SyncError::PartialCreateFailure { .. }
        )
    }
}
