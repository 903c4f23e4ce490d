//! Keystone Handshake
//!
//! Unscoped token, tenant lookup by username, then a token scoped to
//! that tenant. Every identity call answers with a JSON object; anything
//! else (error status, non-JSON, wrong shape) is an authentication failure.

use super::types::{AccessResponse, Credentials, Tenant, TenantList, TokenInfo, TokenRequest, UserList};
use crate::client::transport::{RawResponse, Transport};
use crate::error::{Error, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

const TOKENS_PATH: &str = "/v2.0/tokens";
const TENANTS_PATH: &str = "/v2.0/tenants";
const USERS_PATH: &str = "/v2.0/users";

/// Keystone v2.0 calls against the public and admin endpoints
pub struct IdentityApi<'a> {
    transport: &'a Transport,
    identity_host: &'a str,
    admin_host: &'a str,
}

impl<'a> IdentityApi<'a> {
    pub fn new(transport: &'a Transport, identity_host: &'a str, admin_host: &'a str) -> Self {
        Self {
            transport,
            identity_host,
            admin_host,
        }
    }

    /// Issue a token for the credentials, scoped when `tenant_id` is given
    pub async fn password_token(
        &self,
        credentials: &Credentials,
        tenant_id: Option<&str>,
    ) -> Result<TokenInfo> {
        let body = serde_json::to_value(TokenRequest::password(credentials, tenant_id))?;
        let response = self
            .transport
            .send(Method::POST, self.identity_host, TOKENS_PATH, Some(&body), None)
            .await?;
        let access: AccessResponse = parse_identity(response)?;

        if access.access.token.id.is_empty() {
            return Err(Error::AuthenticationFailed {
                status: 200,
                body: "identity service returned an empty token".into(),
            });
        }
        debug!(
            scoped = tenant_id.is_some(),
            expires = ?access.access.token.expires,
            "Token issued"
        );
        Ok(access.access.token)
    }

    /// Tenants visible to `token`
    pub async fn tenants(&self, token: &str) -> Result<Vec<Tenant>> {
        let response = self
            .transport
            .send(Method::GET, self.identity_host, TENANTS_PATH, None, Some(token))
            .await?;
        let list: TenantList = parse_identity(response)?;
        Ok(list.tenants)
    }

    /// Find the tenant named after the user, using an unscoped token
    pub async fn resolve_tenant(&self, credentials: &Credentials) -> Result<Tenant> {
        let unscoped = self.password_token(credentials, None).await?;
        let tenants = self.tenants(&unscoped.id).await?;
        let tenant = find_tenant(tenants, &credentials.username)?;

        info!(tenant_name = %tenant.name, tenant_id = %tenant.id, "Resolved tenant");
        Ok(tenant)
    }

    /// Id of the user called `name`, read from the admin endpoint
    pub async fn user_id(&self, token: &str, name: &str) -> Result<String> {
        let response = self
            .transport
            .send(Method::GET, self.admin_host, USERS_PATH, None, Some(token))
            .await?;
        let list: UserList = parse_identity(response)?;

        list.users
            .into_iter()
            .find(|u| u.name == name)
            .map(|u| u.id)
            .ok_or_else(|| Error::ResourceNotFound {
                kind: "User".into(),
                name: name.into(),
            })
    }
}

/// Pick the tenant whose name equals `username`
pub fn find_tenant(tenants: Vec<Tenant>, username: &str) -> Result<Tenant> {
    let available: Vec<String> = tenants.iter().map(|t| t.name.clone()).collect();
    let tenant = tenants
        .into_iter()
        .find(|t| t.name == username)
        .ok_or_else(|| Error::TenantNotFound {
            username: username.to_string(),
            available,
        })?;

    if tenant.id.is_empty() {
        return Err(Error::AuthenticationFailed {
            status: 200,
            body: "identity service returned an empty tenant id".into(),
        });
    }
    Ok(tenant)
}

fn parse_identity<T: DeserializeOwned>(response: RawResponse) -> Result<T> {
    let status = response.status.as_u16();
    if !response.is_success() {
        return Err(Error::AuthenticationFailed {
            status,
            body: response.body,
        });
    }
    serde_json::from_str(&response.body).map_err(|e| Error::AuthenticationFailed {
        status,
        body: format!("unexpected identity response ({}): {}", e, response.body),
    })
}
