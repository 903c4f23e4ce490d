//! Cinder Resource Types
//!
//! v1 names things `display_name`/`display_description`, v2 uses
//! `name`/`description`; both are accepted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Volumes
// =============================================================================

/// A volume as returned by the summary listings and by create
///
/// v2 summaries only carry id and name, so size and status are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    #[serde(default, alias = "display_name")]
    pub name: Option<String>,
    /// Size in GB
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A volume as returned by the `/detail` listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDetail {
    #[serde(flatten)]
    pub volume: Volume,
    #[serde(default, alias = "display_description")]
    pub description: Option<String>,
    #[serde(default)]
    pub availability_zone: Option<String>,
    #[serde(default)]
    pub volume_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub bootable: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Server attachment of a volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub server_id: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
}

// =============================================================================
// Snapshots
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    #[serde(default)]
    pub volume_id: Option<String>,
    #[serde(default, alias = "display_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// =============================================================================
// Envelopes
// =============================================================================

/// `{"volumes": [...]}`
#[derive(Debug, Clone, Deserialize)]
pub struct VolumeList<T> {
    pub volumes: Vec<T>,
}

/// `{"snapshots": [...]}`
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotList {
    pub snapshots: Vec<Snapshot>,
}

/// `{"volume": {...}}`, the create request and its response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeEnvelope<T> {
    pub volume: T,
}

/// Body of a create request
#[derive(Debug, Clone, Serialize)]
pub struct CreateVolume {
    /// Size in GB, passed through unvalidated
    pub size: u64,
}
