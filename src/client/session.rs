//! Session State
//!
//! Endpoints, tenant and token held by a connected client.

use crate::config::ClientConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// `host:port` of each service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoints {
    pub identity: String,
    pub admin: String,
    pub storage: String,
}

impl Endpoints {
    pub fn new(host: &str, config: &ClientConfig) -> Self {
        Self {
            identity: format!("{}:{}", host, config.identity_port),
            admin: format!("{}:{}", host, config.admin_port),
            storage: format!("{}:{}", host, config.storage_port),
        }
    }
}

/// Authenticated session. Tenant id never changes; the token is replaced
/// only by re-authentication.
#[derive(Debug, Clone)]
pub struct Session {
    pub endpoints: Endpoints,
    pub tenant_id: String,
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether the token is past (or within `margin` of) its expiry.
    /// Tokens without a reported expiry never need refreshing. A margin
    /// reaching past the representable range always asks for a refresh.
    pub fn needs_refresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        let Some(expires_at) = self.expires_at else {
            return false;
        };
        let Ok(margin) = chrono::Duration::from_std(margin) else {
            return true;
        };
        now.checked_add_signed(margin)
            .map_or(true, |deadline| deadline >= expires_at)
    }
}
