//! Standardized translation of Cattle API HTTP failures into [`SyncError`]

use crate::error::SyncError;
use reqwest::StatusCode;

/// Which side of the Cattle API an operation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiResource {
    Registry,
    Credential,
}

/// Standard error handler for HTTP responses
pub struct HttpErrorHandler;

impl HttpErrorHandler {
    /// Handle a non-success Cattle API response with a status-specific message
    pub fn handle_api_error(
        resource: ApiResource,
        status: StatusCode,
        error_text: &str,
        operation: &str,
    ) -> SyncError {
        let error_msg = match status.as_u16() {
            401 => format!(
                "Unauthorized to {}, check access/secret key: {}",
                operation, error_text
            ),
            403 => format!("Forbidden: insufficient permissions to {}: {}", operation, error_text),
            404 => format!("Resource not found while trying to {}: {}", operation, error_text),
            409 => format!("Conflict while trying to {}: {}", operation, error_text),
            422 => format!("Rejected payload while trying to {}: {}", operation, error_text),
            429 => format!("Rate limited while trying to {}: {}", operation, error_text),
            500 => format!("Server error while trying to {}: {}", operation, error_text),
            502..=504 => format!("API unavailable while trying to {}: {}", operation, error_text),
            _ => format!("Failed to {} (status {}): {}", operation, status, error_text),
        };

        match resource {
            ApiResource::Registry => SyncError::Directory(error_msg),
            ApiResource::Credential => SyncError::CredentialStore(error_msg),
        }
    }

    /// Handle transport failures (connect, timeout, body decode)
    pub fn handle_transport_error(
        resource: ApiResource,
        err: reqwest::Error,
        operation: &str,
    ) -> SyncError {
        let error_msg = if err.is_timeout() {
            format!("Timed out while trying to {}: {}", operation, err)
        } else if err.is_connect() {
            format!("Could not connect while trying to {}: {}", operation, err)
        } else if err.is_decode() {
            format!("Unexpected response body while trying to {}: {}", operation, err)
        } else {
            format!("Request failed while trying to {}: {}", operation, err)
        };

        match resource {
            ApiResource::Registry => SyncError::Directory(error_msg),
            ApiResource::Credential => SyncError::CredentialStore(error_msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_errors_map_to_directory() {
        let err = HttpErrorHandler::handle_api_error(
            ApiResource::Registry,
            StatusCode::UNAUTHORIZED,
            "bad key",
            "list registries",
        );
        match err {
            SyncError::Directory(msg) => {
                assert!(msg.contains("Unauthorized to list registries"));
                assert!(msg.contains("bad key"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_credential_errors_map_to_credential_store() {
        let err = HttpErrorHandler::handle_api_error(
            ApiResource::Credential,
            StatusCode::IM_A_TEAPOT,
            "",
            "update credential",
        );
        match err {
            SyncError::CredentialStore(msg) => assert!(msg.contains("status 418")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
