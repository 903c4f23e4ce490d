//! HTTP Transport
//!
//! The single request primitive every higher-level call goes through:
//! one verb, one `host:port`, one path, an optional JSON body and the
//! current token. No retries and no redirects. Idle connections are not
//! kept, so every exchange opens and closes its own connection.

use crate::error::{Error, Result};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Header carrying the Keystone token
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Raw response of one exchange
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Plain HTTP/1.1 JSON transport
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    timeout: Duration,
}

impl Transport {
    /// Create a transport whose requests all carry `timeout` as deadline
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { http, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform exactly one request and return status and body
    pub async fn send(
        &self,
        method: Method,
        host: &str,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<RawResponse> {
        let url = format!("http://{}{}", host, path);
        debug!(method = %method, url = %url, "Sending request");

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            builder = builder.header(AUTH_TOKEN_HEADER, token);
        }
        if let Some(body) = body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status.is_redirection() {
            debug!(
                location = ?response.headers().get(LOCATION),
                "Redirect not followed"
            );
        }
        let body = response.text().await?;

        debug!(method = %method, url = %url, status = status.as_u16(), "Received response");
        Ok(RawResponse { status, body })
    }

    /// GET/POST: a successful status with a JSON body
    pub async fn request_json(
        &self,
        method: Method,
        host: &str,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Value> {
        let response = self.send(method.clone(), host, path, body, token).await?;
        if !response.is_success() {
            return Err(request_error(&method, path, response));
        }
        Ok(serde_json::from_str(&response.body)?)
    }

    /// DELETE: success or the storage service's reason for refusing
    pub async fn delete(&self, host: &str, path: &str, token: Option<&str>) -> Result<()> {
        let response = self.send(Method::DELETE, host, path, None, token).await?;
        if !response.is_success() {
            return Err(request_error(&Method::DELETE, path, response));
        }
        Ok(())
    }
}

fn request_error(method: &Method, path: &str, response: RawResponse) -> Error {
    Error::Request {
        method: method.to_string(),
        path: path.to_string(),
        status: response.status.as_u16(),
        body: response.body,
    }
}
