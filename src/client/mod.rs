//! Cloud Storage Client
//!
//! Authenticates against Keystone and drives Cinder volume operations.
//!
//! A client only exists once the whole handshake has succeeded:
//!
//! ```text
//! Unauthenticated ──► HostsResolved ──► UnscopedTokenHeld ──► TenantResolved ──► Ready
//!   (host or NIC)      POST /v2.0/tokens   GET /v2.0/tenants    POST /v2.0/tokens
//! ```
//!
//! Every operation is one HTTP round trip keyed by the tenant id and token.

pub mod session;
pub mod transport;

pub use session::*;
pub use transport::*;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::identity::{Credentials, IdentityApi};
use crate::network::NetworkInterfaceResolver;
use crate::storage::{
    collect_outcomes, plan_volume_sizes, snapshots_path, substitute_tenant, volume_path,
    volumes_path, ApiVersion, CreateVolume, SnapshotList, Snapshot, Volume, VolumeDetail,
    VolumeEnvelope, VolumeList, VolumeQuery, DEFAULT_VOLUME_SIZE_GB,
};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Status filter used by [`CloudStorageClient::list_volumes_filtered`]
pub const IN_USE_STATUS: &str = "in-use";

/// Keystone-authenticated Cinder client
pub struct CloudStorageClient {
    config: ClientConfig,
    credentials: Credentials,
    transport: Transport,
    session: RwLock<Session>,
}

impl CloudStorageClient {
    /// Resolve the host, resolve the tenant and acquire a scoped token.
    ///
    /// When `config.host` is unset the address of `config.interface` is used.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let host = match &config.host {
            Some(host) => host.clone(),
            None => {
                let resolver = NetworkInterfaceResolver::from_system()?;
                resolver.resolve(&config.interface)?
            }
        };
        Self::connect_to(host, config).await
    }

    /// Like [`connect`](Self::connect), resolving the host from an existing
    /// interface snapshot when `config.host` is unset
    pub async fn connect_with_resolver(
        config: ClientConfig,
        resolver: &NetworkInterfaceResolver,
    ) -> Result<Self> {
        config.validate()?;
        let host = match &config.host {
            Some(host) => host.clone(),
            None => resolver.resolve(&config.interface)?,
        };
        Self::connect_to(host, config).await
    }

    async fn connect_to(host: String, config: ClientConfig) -> Result<Self> {
        let endpoints = Endpoints::new(&host, &config);
        info!(
            identity = %endpoints.identity,
            storage = %endpoints.storage,
            username = %config.username,
            "Connecting to cloud"
        );

        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let transport = Transport::new(config.request_timeout())?;

        let identity = IdentityApi::new(&transport, &endpoints.identity, &endpoints.admin);
        let tenant = identity.resolve_tenant(&credentials).await?;
        let token = identity.password_token(&credentials, Some(&tenant.id)).await?;
        let expires_at = token.expires_at();

        info!(tenant_id = %tenant.id, expires_at = ?expires_at, "Client ready");

        let session = Session {
            endpoints,
            tenant_id: tenant.id,
            token: token.id,
            expires_at,
        };

        Ok(Self {
            config,
            credentials,
            transport,
            session: RwLock::new(session),
        })
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn endpoints(&self) -> Endpoints {
        self.session.read().await.endpoints.clone()
    }

    pub async fn tenant_id(&self) -> String {
        self.session.read().await.tenant_id.clone()
    }

    pub async fn token(&self) -> String {
        self.session.read().await.token.clone()
    }

    pub async fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.session.read().await.expires_at
    }

    /// Acquire a fresh scoped token for the resolved tenant
    pub async fn reauthenticate(&self) -> Result<()> {
        let mut session = self.session.write().await;
        self.refresh_locked(&mut session).await
    }

    async fn refresh_locked(&self, session: &mut Session) -> Result<()> {
        let identity = IdentityApi::new(
            &self.transport,
            &session.endpoints.identity,
            &session.endpoints.admin,
        );
        let token = identity
            .password_token(&self.credentials, Some(&session.tenant_id))
            .await?;
        session.expires_at = token.expires_at();
        session.token = token.id;
        info!(expires_at = ?session.expires_at, "Token refreshed");
        Ok(())
    }

    /// Snapshot of the session, re-authenticating first if the token expired
    async fn ready(&self) -> Result<Session> {
        let margin = self.config.token_refresh_margin();
        {
            let session = self.session.read().await;
            if !session.needs_refresh(Utc::now(), margin) {
                return Ok(session.clone());
            }
        }

        let mut session = self.session.write().await;
        // Another caller may have refreshed while we waited for the lock
        if session.needs_refresh(Utc::now(), margin) {
            warn!(expires_at = ?session.expires_at, "Token expired, re-authenticating");
            self.refresh_locked(&mut session).await?;
        }
        Ok(session.clone())
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Id of the user called `name` (usually "admin"), from the admin endpoint
    pub async fn admin_user_id(&self, name: &str) -> Result<String> {
        let session = self.ready().await?;
        let identity = IdentityApi::new(
            &self.transport,
            &session.endpoints.identity,
            &session.endpoints.admin,
        );
        let id = identity.user_id(&session.token, name).await?;
        info!(user = name, user_id = %id, "Resolved user");
        Ok(id)
    }

    // =========================================================================
    // Requests
    // =========================================================================

    async fn storage_get<T: DeserializeOwned>(&self, session: &Session, path: &str) -> Result<T> {
        let value = self
            .transport
            .request_json(
                Method::GET,
                &session.endpoints.storage,
                path,
                None,
                Some(&session.token),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    // =========================================================================
    // Volumes
    // =========================================================================

    /// Create a volume of `size_gb` GB (not validated)
    pub async fn create_volume(&self, size_gb: u64) -> Result<Volume> {
        let session = self.ready().await?;
        let body = serde_json::to_value(VolumeEnvelope {
            volume: CreateVolume { size: size_gb },
        })?;
        let path = volumes_path(ApiVersion::V1, &session.tenant_id);

        let value = self
            .transport
            .request_json(
                Method::POST,
                &session.endpoints.storage,
                &path,
                Some(&body),
                Some(&session.token),
            )
            .await?;
        let created: VolumeEnvelope<Volume> = serde_json::from_value(value)?;

        info!(volume_id = %created.volume.id, size_gb = size_gb, "Created volume");
        Ok(created.volume)
    }

    /// Run any volume listing
    pub async fn query_volumes<T: DeserializeOwned>(&self, query: &VolumeQuery) -> Result<Vec<T>> {
        let session = self.ready().await?;
        let path = query.path(&session.tenant_id);
        let list: VolumeList<T> = self.storage_get(&session, &path).await?;
        debug!(path = %path, count = list.volumes.len(), "Listed volumes");
        Ok(list.volumes)
    }

    /// `GET /v1/{tenant}/volumes`
    pub async fn list_volumes(&self) -> Result<Vec<Volume>> {
        self.query_volumes(&VolumeQuery::new(ApiVersion::V1)).await
    }

    /// `GET /v1/{tenant}/volumes?status=in-use`
    pub async fn list_volumes_filtered(&self) -> Result<Vec<Volume>> {
        self.query_volumes(&VolumeQuery::new(ApiVersion::V1).with_status(IN_USE_STATUS))
            .await
    }

    /// `GET /v1/{tenant}/volumes/detail`
    pub async fn list_volumes_detailed(&self) -> Result<Vec<VolumeDetail>> {
        self.query_volumes(&VolumeQuery::new(ApiVersion::V1).detailed())
            .await
    }

    /// `GET /v2/{tenant}/volumes`
    pub async fn list_volumes_v2(&self) -> Result<Vec<Volume>> {
        self.query_volumes(&VolumeQuery::new(ApiVersion::V2)).await
    }

    /// `GET /v2/{tenant}/volumes/detail`
    pub async fn list_volumes_detailed_v2(&self) -> Result<Vec<VolumeDetail>> {
        self.query_volumes(&VolumeQuery::new(ApiVersion::V2).detailed())
            .await
    }

    /// `GET /v2/{tenant}/snapshots`
    pub async fn list_snapshots(&self) -> Result<Vec<Snapshot>> {
        let session = self.ready().await?;
        let list: SnapshotList = self
            .storage_get(&session, &snapshots_path(&session.tenant_id))
            .await?;
        Ok(list.snapshots)
    }

    /// GET an arbitrary storage path. Each literal `tenantid` in the
    /// template is replaced by the tenant id; the raw JSON is returned.
    pub async fn get_by_path(&self, template: &str) -> Result<Value> {
        let session = self.ready().await?;
        let path = substitute_tenant(template, &session.tenant_id)?;
        let value: Value = self.storage_get(&session, &path).await?;

        if let Some(volumes) = value.get("volumes").and_then(Value::as_array) {
            info!(path = %path, count = volumes.len(), "Fetched volumes");
        }
        Ok(value)
    }

    /// `DELETE /v1/{tenant}/volumes/{id}`
    pub async fn delete_volume(&self, volume_id: &str) -> Result<()> {
        let session = self.ready().await?;
        let path = volume_path(&session.tenant_id, volume_id);
        self.transport
            .delete(&session.endpoints.storage, &path, Some(&session.token))
            .await?;
        info!(volume_id = volume_id, "Deleted volume");
        Ok(())
    }

    // =========================================================================
    // Bulk
    // =========================================================================

    /// Delete every listed volume. Every delete is attempted; the ids that
    /// were deleted are returned, or a partial failure naming the rest.
    pub async fn delete_all_volumes(&self) -> Result<Vec<String>> {
        let ids: Vec<String> = self
            .list_volumes()
            .await?
            .into_iter()
            .map(|v| v.id)
            .collect();
        info!(count = ids.len(), "Deleting all volumes");

        let outcomes: Vec<(String, Result<String>)> = stream::iter(ids)
            .map(|id| async move {
                let outcome = self.delete_volume(&id).await.map(|_| id.clone());
                (id, outcome)
            })
            .buffered(self.config.bulk_concurrency)
            .collect()
            .await;

        let deleted = collect_outcomes("delete_all_volumes", outcomes)?;
        info!(count = deleted.len(), "Deleted all volumes");
        Ok(deleted)
    }

    /// Create `count` volumes. Slot `i` gets `sizes[i]`, or 1 GB past the
    /// end of `sizes`.
    pub async fn create_volumes(&self, count: usize, sizes: &[u64]) -> Result<Vec<Volume>> {
        let plan = plan_volume_sizes(count, sizes, DEFAULT_VOLUME_SIZE_GB);
        info!(count = count, sizes = ?plan, "Creating volumes");

        let outcomes: Vec<(String, Result<Volume>)> = stream::iter(plan.into_iter().enumerate())
            .map(|(slot, size)| async move {
                (
                    format!("volume #{} ({} GB)", slot, size),
                    self.create_volume(size).await,
                )
            })
            .buffered(self.config.bulk_concurrency)
            .collect()
            .await;

        collect_outcomes("create_volumes", outcomes)
    }
}
