//! Cinder Request Paths
//!
//! The volume listings differ only in API version, the `/detail` suffix
//! and a status filter, so they share one query type.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use urlencoding::encode;

/// Placeholder replaced by the tenant id in [`substitute_tenant`]
pub const TENANT_PLACEHOLDER: &str = "tenantid";

/// Cinder API version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    #[default]
    V1,
    V2,
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiVersion::V1 => write!(f, "v1"),
            ApiVersion::V2 => write!(f, "v2"),
        }
    }
}

impl FromStr for ApiVersion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "v1" | "1" => Ok(ApiVersion::V1),
            "v2" | "2" => Ok(ApiVersion::V2),
            other => Err(format!("Invalid API version: {}. Use 'v1' or 'v2'", other)),
        }
    }
}

/// A volume listing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeQuery {
    pub version: ApiVersion,
    /// Ask for the `/detail` variant
    pub detail: bool,
    /// Server-side `status=` filter
    pub status: Option<String>,
}

impl VolumeQuery {
    pub fn new(version: ApiVersion) -> Self {
        Self {
            version,
            ..Default::default()
        }
    }

    pub fn detailed(mut self) -> Self {
        self.detail = true;
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Request path for `tenant_id`
    pub fn path(&self, tenant_id: &str) -> String {
        let mut path = volumes_path(self.version, tenant_id);
        if self.detail {
            path.push_str("/detail");
        }
        if let Some(status) = &self.status {
            path.push_str("?status=");
            path.push_str(&encode(status));
        }
        path
    }
}

/// `/{version}/{tenant}/volumes`
pub fn volumes_path(version: ApiVersion, tenant_id: &str) -> String {
    format!("/{}/{}/volumes", version, encode(tenant_id))
}

/// `/v1/{tenant}/volumes/{id}`
pub fn volume_path(tenant_id: &str, volume_id: &str) -> String {
    format!("{}/{}", volumes_path(ApiVersion::V1, tenant_id), encode(volume_id))
}

/// `/v2/{tenant}/snapshots`
pub fn snapshots_path(tenant_id: &str) -> String {
    format!("/{}/{}/snapshots", ApiVersion::V2, encode(tenant_id))
}

/// Replace every literal `tenantid` in a caller path with the encoded
/// tenant id. No other placeholders are recognised.
pub fn substitute_tenant(template: &str, tenant_id: &str) -> Result<String> {
    if !template.starts_with('/') {
        return Err(Error::Configuration(format!(
            "Request path must start with '/': {}",
            template
        )));
    }
    Ok(template.replace(TENANT_PLACEHOLDER, &encode(tenant_id)))
}
