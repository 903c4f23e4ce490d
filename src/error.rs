//! Error types for cinderctl
//!
//! Provides structured error types for host resolution, the identity
//! handshake, storage requests and bulk operations.

use thiserror::Error;

/// One failed sub-operation of a bulk call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationFailure {
    /// What the sub-operation acted on (volume id, or slot and size)
    pub target: String,
    /// Rendered error of the sub-operation
    pub reason: String,
}

impl std::fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.target, self.reason)
    }
}

fn join_failures(failures: &[OperationFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Unified error type for the client
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Host Resolution Errors
    // =========================================================================
    #[error("Host resolution failed for interface {interface}: {reason}")]
    HostResolution { interface: String, reason: String },

    // =========================================================================
    // Identity Errors
    // =========================================================================
    #[error("Authentication failed (status {status}): {body}")]
    AuthenticationFailed { status: u16, body: String },

    #[error("No tenant named {username} (tenants returned: {})", .available.join(", "))]
    TenantNotFound {
        username: String,
        available: Vec<String>,
    },

    #[error("Resource not found: {kind}/{name}")]
    ResourceNotFound { kind: String, name: String },

    // =========================================================================
    // Storage Errors
    // =========================================================================
    #[error("{method} {path} failed with status {status}: {body}")]
    Request {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error(
        "{operation}: {} of {attempted} sub-operations failed ({})",
        .failures.len(),
        join_failures(.failures)
    )]
    PartialFailure {
        operation: String,
        attempted: usize,
        failures: Vec<OperationFailure>,
    },

    // =========================================================================
    // Transport / Parse Errors
    // =========================================================================
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::AuthenticationFailed { status, .. } | Error::Request { status, .. } => {
                Some(*status)
            }
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is transient
    ///
    /// Nothing in the client retries; this only informs callers.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            Error::Request { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias for the client
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_not_found_lists_tenants() {
        let err = Error::TenantNotFound {
            username: "demo".into(),
            available: vec!["admin".into(), "service".into()],
        };
        assert_eq!(
            err.to_string(),
            "No tenant named demo (tenants returned: admin, service)"
        );
    }

    #[test]
    fn test_partial_failure_display() {
        let err = Error::PartialFailure {
            operation: "delete_all".into(),
            attempted: 3,
            failures: vec![OperationFailure {
                target: "vol-2".into(),
                reason: "gone".into(),
            }],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("delete_all: 1 of 3"));
        assert!(msg.contains("vol-2: gone"));
    }

    #[test]
    fn test_error_transient() {
        let server = Error::Request {
            method: "GET".into(),
            path: "/v1/t/volumes".into(),
            status: 503,
            body: String::new(),
        };
        assert!(server.is_transient());
        assert_eq!(server.status(), Some(503));

        let missing = Error::Request {
            method: "DELETE".into(),
            path: "/v1/t/volumes/x".into(),
            status: 404,
            body: String::new(),
        };
        assert!(!missing.is_transient());

        let config_err = Error::Configuration("invalid".into());
        assert!(!config_err.is_transient());
        assert_eq!(config_err.status(), None);
    }
}
