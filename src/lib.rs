//! cinderctl - Keystone-authenticated Cinder client
//!
//! Authenticates against an OpenStack identity service (Keystone v2.0) and
//! manages block-storage volumes on the storage service (Cinder).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     CloudStorageClient                       │
//! │  ┌──────────────────┐  ┌──────────────┐  ┌────────────────┐  │
//! │  │ Interface        │  │  Identity    │  │   Storage      │  │
//! │  │ Resolver (NICs)  │  │  (Keystone)  │  │   (Cinder)     │  │
//! │  └────────┬─────────┘  └──────┬───────┘  └───────┬────────┘  │
//! │           │ host              │ tenant + token   │ volumes   │
//! │           └───────────────────┼──────────────────┘           │
//! │                      ┌────────┴────────┐                     │
//! │                      │ HTTP Transport  │                     │
//! │                      └─────────────────┘                     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use cinderctl::{ClientConfig, CloudStorageClient};
//!
//! # async fn run() -> cinderctl::Result<()> {
//! let config = ClientConfig::default().with_host("10.0.0.5");
//! let client = CloudStorageClient::connect(config).await?;
//!
//! let volume = client.create_volume(1).await?;
//! for v in client.list_volumes().await? {
//!     println!("{} {:?} {:?}", v.id, v.size, v.status);
//! }
//! client.delete_volume(&volume.id).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`client`]: The client, its session and the HTTP transport
//! - [`identity`]: Keystone wire types and handshake
//! - [`storage`]: Cinder types, request paths and bulk helpers
//! - [`network`]: Local interface introspection
//! - [`config`]: Client configuration
//! - [`error`]: Error types

pub mod client;
pub mod config;
pub mod error;
pub mod identity;
pub mod network;
pub mod storage;

// Re-export commonly used types
pub use client::{CloudStorageClient, Endpoints, Session, Transport};
pub use config::ClientConfig;
pub use error::{Error, OperationFailure, Result};
pub use identity::{Credentials, Tenant, User};
pub use network::{InterfaceAddress, NetworkInterfaceResolver};
pub use storage::{
    plan_volume_sizes, ApiVersion, Attachment, Snapshot, Volume, VolumeDetail, VolumeQuery,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
