//! Client Configuration
//!
//! Every knob the client needs at construction, with documented defaults.
//! Can be built in code, or loaded from a YAML file.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// =============================================================================
// Defaults
// =============================================================================

/// Default username when none is supplied
pub const DEFAULT_USERNAME: &str = "demo";
/// Default password when none is supplied
pub const DEFAULT_PASSWORD: &str = "nova";
/// Interface whose address is used when no host is supplied
pub const DEFAULT_INTERFACE: &str = "wlan0";
/// Keystone public port
pub const DEFAULT_IDENTITY_PORT: u16 = 5000;
/// Keystone admin port
pub const DEFAULT_ADMIN_PORT: u16 = 35357;
/// Cinder API port
pub const DEFAULT_STORAGE_PORT: u16 = 8776;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for [`CloudStorageClient`](crate::CloudStorageClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Host running Keystone and Cinder. Resolved from `interface` when unset.
    pub host: Option<String>,
    /// Username; the tenant with the same name is used
    pub username: String,
    /// Password
    pub password: String,
    /// Local interface used to guess the host
    pub interface: String,
    /// Keystone public port
    pub identity_port: u16,
    /// Keystone admin port
    pub admin_port: u16,
    /// Cinder port
    pub storage_port: u16,
    /// Deadline applied to every request, in seconds
    pub request_timeout_secs: u64,
    /// Re-authenticate this many seconds before the token expires
    pub token_refresh_margin_secs: u64,
    /// Sub-requests in flight during bulk operations
    pub bulk_concurrency: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: None,
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            interface: DEFAULT_INTERFACE.to_string(),
            identity_port: DEFAULT_IDENTITY_PORT,
            admin_port: DEFAULT_ADMIN_PORT,
            storage_port: DEFAULT_STORAGE_PORT,
            request_timeout_secs: 30,
            token_refresh_margin_secs: 60,
            bulk_concurrency: 1,
        }
    }
}

impl ClientConfig {
    /// Parse a configuration from YAML text. Missing keys take defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: ClientConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Point the client at an explicit host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Override the credentials
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Override the identity, admin and storage ports
    pub fn with_ports(mut self, identity: u16, admin: u16, storage: u16) -> Self {
        self.identity_port = identity;
        self.admin_port = admin;
        self.storage_port = storage;
        self
    }

    /// Reject values the client cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(Error::Configuration("username must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Configuration(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.bulk_concurrency == 0 {
            return Err(Error::Configuration(
                "bulk_concurrency must be at least 1".into(),
            ));
        }
        if matches!(self.host.as_deref(), Some("")) {
            return Err(Error::Configuration("host must not be empty".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn token_refresh_margin(&self) -> Duration {
        Duration::from_secs(self.token_refresh_margin_secs)
    }
}
