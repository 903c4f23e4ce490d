//! Keystone v2.0 request and response bodies

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Credentials
// =============================================================================

/// Username and password, fixed for the client's lifetime
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Token Request
// =============================================================================

/// `POST /v2.0/tokens` body
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub auth: AuthBody<'a>,
}

#[derive(Debug, Serialize)]
pub struct AuthBody<'a> {
    #[serde(rename = "passwordCredentials")]
    pub password_credentials: PasswordCredentials<'a>,
    #[serde(rename = "tenantId", skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct PasswordCredentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl<'a> TokenRequest<'a> {
    /// Unscoped when `tenant_id` is `None`
    pub fn password(credentials: &'a Credentials, tenant_id: Option<&'a str>) -> Self {
        Self {
            auth: AuthBody {
                password_credentials: PasswordCredentials {
                    username: &credentials.username,
                    password: &credentials.password,
                },
                tenant_id,
            },
        }
    }
}

// =============================================================================
// Responses
// =============================================================================

/// `POST /v2.0/tokens` response
#[derive(Debug, Clone, Deserialize)]
pub struct AccessResponse {
    pub access: Access,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Access {
    pub token: TokenInfo,
}

/// Issued token
#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub id: String,
    #[serde(default)]
    pub expires: Option<String>,
}

impl TokenInfo {
    /// Expiry as reported by Keystone. Timestamps without an offset are UTC.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.expires.as_deref()?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// `GET /v2.0/tenants` response
#[derive(Debug, Clone, Deserialize)]
pub struct TenantList {
    pub tenants: Vec<Tenant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
}

/// `GET /v2.0/users` response
#[derive(Debug, Clone, Deserialize)]
pub struct UserList {
    pub users: Vec<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}
