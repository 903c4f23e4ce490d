//! In-process fake Keystone v2.0 and Cinder services
//!
//! Identity (public and admin) is served on one listener, storage on
//! another, both bound to loopback on ephemeral ports.

#![allow(dead_code)]

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use cinderctl::ClientConfig;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

pub const TENANT_ID: &str = "c0ffee0000000000000000000000demo";
pub const ADMIN_USER_ID: &str = "a11ce000000000000000000000000000";

#[derive(Debug, Clone)]
pub struct FakeVolume {
    pub id: String,
    pub size: u64,
    pub status: String,
}

/// Everything the fake services know, and a record of what they were asked
#[derive(Debug)]
pub struct CloudState {
    pub username: String,
    pub password: String,
    pub tenants: Vec<(String, String)>,
    pub users: Vec<(String, String)>,
    /// `expires` reported with scoped tokens
    pub scoped_expires: Option<String>,
    pub volumes: BTreeMap<String, FakeVolume>,
    pub next_id: u64,
    pub unscoped_requests: usize,
    pub scoped_requests: usize,
    pub valid_tokens: BTreeSet<String>,
    pub created_sizes: Vec<u64>,
    pub delete_calls: Vec<String>,
    /// Deletes of these ids answer 500
    pub failing_deletes: BTreeSet<String>,
    /// Creates of these sizes answer 500
    pub failing_sizes: BTreeSet<u64>,
    /// Summary listings answer 200 with an HTML body
    pub html_listings: bool,
}

impl Default for CloudState {
    fn default() -> Self {
        Self {
            username: "demo".into(),
            password: "nova".into(),
            tenants: vec![
                ("ad000000000000000000000000000001".into(), "admin".into()),
                (TENANT_ID.into(), "demo".into()),
            ],
            users: vec![
                (ADMIN_USER_ID.into(), "admin".into()),
                ("de000000000000000000000000000002".into(), "demo".into()),
            ],
            scoped_expires: Some("2999-01-01T00:00:00Z".into()),
            volumes: BTreeMap::new(),
            next_id: 0,
            unscoped_requests: 0,
            scoped_requests: 0,
            valid_tokens: BTreeSet::new(),
            created_sizes: Vec::new(),
            delete_calls: Vec::new(),
            failing_deletes: BTreeSet::new(),
            failing_sizes: BTreeSet::new(),
            html_listings: false,
        }
    }
}

impl CloudState {
    pub fn add_volume(&mut self, size: u64, status: &str) -> String {
        self.next_id += 1;
        let id = format!("vol-{:04}", self.next_id);
        self.volumes.insert(
            id.clone(),
            FakeVolume {
                id: id.clone(),
                size,
                status: status.into(),
            },
        );
        id
    }
}

type Shared = Arc<Mutex<CloudState>>;

/// Running fake cloud
pub struct FakeCloud {
    pub state: Shared,
    pub identity_port: u16,
    pub storage_port: u16,
}

impl FakeCloud {
    pub async fn start() -> Self {
        Self::start_with(CloudState::default()).await
    }

    pub async fn start_with(state: CloudState) -> Self {
        let state = Arc::new(Mutex::new(state));

        let identity = Router::new()
            .route("/v2.0/tokens", post(issue_token))
            .route("/v2.0/tenants", get(list_tenants))
            .route("/v2.0/users", get(list_users))
            .with_state(state.clone());

        let storage = Router::new()
            .route("/:version/:tenant/volumes", get(list_volumes).post(create_volume))
            .route(
                "/:version/:tenant/volumes/:id",
                get(list_volumes_detail).delete(delete_volume),
            )
            .route("/:version/:tenant/snapshots", get(list_snapshots))
            .with_state(state.clone());

        let identity_port = serve(identity).await;
        let storage_port = serve(storage).await;

        Self {
            state,
            identity_port,
            storage_port,
        }
    }

    /// Client configuration pointing at this cloud
    pub fn config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_host("127.0.0.1")
            .with_ports(self.identity_port, self.identity_port, self.storage_port)
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, CloudState> {
        self.state.lock().unwrap()
    }
}

async fn serve(router: Router) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    port
}

fn token_of(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-auth-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"code": 401, "message": "The request you have made requires authentication."}})),
    )
        .into_response()
}

// =============================================================================
// Identity
// =============================================================================

async fn issue_token(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut s = state.lock().unwrap();
    let creds = &body["auth"]["passwordCredentials"];
    if creds["username"] != s.username.as_str() || creds["password"] != s.password.as_str() {
        return unauthorized();
    }

    let token = match body["auth"]["tenantId"].as_str() {
        Some(tenant_id) => {
            if !s.tenants.iter().any(|(id, _)| id == tenant_id) {
                return unauthorized();
            }
            s.scoped_requests += 1;
            format!("scoped-{}", s.scoped_requests)
        }
        None => {
            s.unscoped_requests += 1;
            format!("unscoped-{}", s.unscoped_requests)
        }
    };
    s.valid_tokens.insert(token.clone());

    let mut token_body = json!({"id": token});
    if token.starts_with("scoped-") {
        if let Some(expires) = &s.scoped_expires {
            token_body["expires"] = json!(expires);
        }
    }
    Json(json!({"access": {"token": token_body, "serviceCatalog": []}})).into_response()
}

async fn list_tenants(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let s = state.lock().unwrap();
    match token_of(&headers) {
        Some(t) if s.valid_tokens.contains(&t) => {}
        _ => return unauthorized(),
    }
    let tenants: Vec<Value> = s
        .tenants
        .iter()
        .map(|(id, name)| json!({"id": id, "name": name, "enabled": true}))
        .collect();
    Json(json!({"tenants": tenants, "tenants_links": []})).into_response()
}

async fn list_users(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let s = state.lock().unwrap();
    match token_of(&headers) {
        Some(t) if t.starts_with("scoped-") && s.valid_tokens.contains(&t) => {}
        _ => return unauthorized(),
    }
    let users: Vec<Value> = s
        .users
        .iter()
        .map(|(id, name)| json!({"id": id, "name": name, "enabled": true}))
        .collect();
    Json(json!({"users": users})).into_response()
}

// =============================================================================
// Storage
// =============================================================================

fn check_scoped(s: &CloudState, headers: &HeaderMap, tenant: &str) -> Option<Response> {
    match token_of(headers) {
        Some(t) if t.starts_with("scoped-") && s.valid_tokens.contains(&t) => {}
        _ => return Some(unauthorized()),
    }
    if tenant != TENANT_ID {
        return Some((StatusCode::FORBIDDEN, Json(json!({"forbidden": {}}))).into_response());
    }
    None
}

fn summary(version: &str, v: &FakeVolume) -> Value {
    if version == "v2" {
        json!({"id": v.id, "name": format!("name-{}", v.id), "links": []})
    } else {
        json!({"id": v.id, "display_name": format!("name-{}", v.id), "size": v.size, "status": v.status})
    }
}

fn detail(version: &str, v: &FakeVolume) -> Value {
    let name_key = if version == "v2" { "name" } else { "display_name" };
    let attachments = if v.status == "in-use" {
        json!([{"server_id": "srv-1", "device": "/dev/vdb"}])
    } else {
        json!([])
    };
    let mut body = json!({
        "id": v.id,
        "size": v.size,
        "status": v.status,
        "availability_zone": "nova",
        "volume_type": "lvmdriver-1",
        "created_at": "2026-10-16T10:00:00.000000",
        "bootable": "false",
        "attachments": attachments,
        "metadata": {}
    });
    body[name_key] = json!(format!("name-{}", v.id));
    body
}

async fn list_volumes(
    State(state): State<Shared>,
    Path((version, tenant)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let s = state.lock().unwrap();
    if let Some(rejection) = check_scoped(&s, &headers, &tenant) {
        return rejection;
    }
    if s.html_listings {
        return (StatusCode::OK, "<html><body>maintenance</body></html>").into_response();
    }
    let volumes: Vec<Value> = s
        .volumes
        .values()
        .filter(|v| params.get("status").map_or(true, |st| &v.status == st))
        .map(|v| summary(&version, v))
        .collect();
    Json(json!({"volumes": volumes})).into_response()
}

async fn list_volumes_detail(
    State(state): State<Shared>,
    Path((version, tenant, id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let s = state.lock().unwrap();
    if let Some(rejection) = check_scoped(&s, &headers, &tenant) {
        return rejection;
    }
    if id != "detail" {
        return match s.volumes.get(&id) {
            Some(v) => Json(json!({"volume": detail(&version, v)})).into_response(),
            None => (StatusCode::NOT_FOUND, Json(json!({"itemNotFound": {}}))).into_response(),
        };
    }
    let volumes: Vec<Value> = s.volumes.values().map(|v| detail(&version, v)).collect();
    Json(json!({"volumes": volumes})).into_response()
}

async fn create_volume(
    State(state): State<Shared>,
    Path((version, tenant)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut s = state.lock().unwrap();
    if let Some(rejection) = check_scoped(&s, &headers, &tenant) {
        return rejection;
    }
    let Some(size) = body["volume"]["size"].as_u64() else {
        return (StatusCode::BAD_REQUEST, Json(json!({"badRequest": {}}))).into_response();
    };
    s.created_sizes.push(size);
    if s.failing_sizes.contains(&size) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"computeFault": {"message": "no valid host"}})),
        )
            .into_response();
    }
    let id = s.add_volume(size, "creating");
    let volume = s.volumes[&id].clone();
    Json(json!({"volume": summary(&version, &volume)})).into_response()
}

async fn delete_volume(
    State(state): State<Shared>,
    Path((_version, tenant, id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut s = state.lock().unwrap();
    if let Some(rejection) = check_scoped(&s, &headers, &tenant) {
        return rejection;
    }
    s.delete_calls.push(id.clone());
    if s.failing_deletes.contains(&id) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"computeFault": {"message": "backend unavailable"}})),
        )
            .into_response();
    }
    match s.volumes.remove(&id) {
        Some(_) => StatusCode::ACCEPTED.into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"itemNotFound": {}}))).into_response(),
    }
}

async fn list_snapshots(
    State(state): State<Shared>,
    Path((_version, tenant)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let s = state.lock().unwrap();
    if let Some(rejection) = check_scoped(&s, &headers, &tenant) {
        return rejection;
    }
    let snapshots: Vec<Value> = s
        .volumes
        .values()
        .map(|v| {
            json!({
                "id": format!("snap-{}", v.id),
                "volume_id": v.id,
                "name": null,
                "size": v.size,
                "status": "available",
                "created_at": "2026-10-16T10:05:00.000000"
            })
        })
        .collect();
    Json(json!({"snapshots": snapshots})).into_response()
}
