//! In-process stand-ins for the Career Coach backend and the identity provider,
//! served by axum on ephemeral ports.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Multipart, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

pub const TEST_USER_ID: &str = "7f0c1a0e-5c1e-4a43-9d2e-0a6f4b8a3d11";

// ────────────────────────────────────────────────────────────────────────────
// Shared plumbing
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Recorded {
    pub health_calls: usize,
    pub upload_calls: usize,
    pub analyze_calls: usize,
    pub token_calls: usize,
    pub logout_calls: usize,
    pub last_file_name: Option<String>,
    pub last_analyze_fields: HashMap<String, String>,
    pub last_grant_type: Option<String>,
    pub last_token_body: Option<Value>,
    pub last_apikey: Option<String>,
    pub last_bearer: Option<String>,
}

pub struct MockServer {
    pub url: String,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockServer {
    pub fn recorded<T>(&self, f: impl FnOnce(&Recorded) -> T) -> T {
        f(&self.recorded.lock().unwrap())
    }

    pub fn upload_calls(&self) -> usize {
        self.recorded(|r| r.upload_calls)
    }

    pub fn analyze_calls(&self) -> usize {
        self.recorded(|r| r.analyze_calls)
    }

    pub fn total_backend_calls(&self) -> usize {
        self.recorded(|r| r.health_calls + r.upload_calls + r.analyze_calls)
    }

    pub fn last_file_name(&self) -> Option<String> {
        self.recorded(|r| r.last_file_name.clone())
    }

    pub fn last_analyze_fields(&self) -> HashMap<String, String> {
        self.recorded(|r| r.last_analyze_fields.clone())
    }
}

pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn reply(status: u16, body: String) -> Response {
    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

// ────────────────────────────────────────────────────────────────────────────
// Backend
// ────────────────────────────────────────────────────────────────────────────

/// Canned backend behaviour. An empty `upload_body` echoes the uploaded
/// contents back as `{"text": "extracted: <contents>"}`.
#[derive(Debug, Clone)]
pub struct MockBackend {
    pub health_status: u16,
    pub upload_status: u16,
    pub upload_body: String,
    pub analyze_status: u16,
    pub analyze_body: String,
    pub analyze_delay: Duration,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            health_status: 200,
            upload_status: 200,
            upload_body: String::new(),
            analyze_status: 200,
            analyze_body: json!({
                "match_percentage": 85,
                "strengths": ["Rust"],
                "weaknesses": ["Kubernetes"],
                "suggestions": ["Quantify the latency work"],
                "learning_suggestions": ["Helm charts"]
            })
            .to_string(),
            analyze_delay: Duration::ZERO,
        }
    }
}

#[derive(Clone)]
struct BackendState {
    config: Arc<MockBackend>,
    recorded: Arc<Mutex<Recorded>>,
}

pub async fn mock_backend(config: MockBackend) -> MockServer {
    let recorded = Arc::new(Mutex::new(Recorded::default()));
    let state = BackendState {
        config: Arc::new(config),
        recorded: Arc::clone(&recorded),
    };
    let app = Router::new()
        .route("/health", get(health))
        .route("/upload-cv", post(upload_cv))
        .route("/analyze", post(analyze))
        .with_state(state);

    MockServer {
        url: serve(app).await,
        recorded,
    }
}

async fn health(State(state): State<BackendState>) -> Response {
    state.recorded.lock().unwrap().health_calls += 1;
    if state.config.health_status != 200 {
        return reply(state.config.health_status, json!({"detail": "down"}).to_string());
    }
    reply(
        200,
        json!({
            "status": "healthy",
            "service": "career-coach-api",
            "timestamp": "2024-05-01T12:00:00"
        })
        .to_string(),
    )
}

async fn upload_cv(State(state): State<BackendState>, mut multipart: Multipart) -> Response {
    let mut file_name = None;
    let mut contents = String::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            file_name = field.file_name().map(String::from);
            let data = field.bytes().await.unwrap_or_default();
            contents = String::from_utf8_lossy(&data).into_owned();
        }
    }

    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.upload_calls += 1;
        recorded.last_file_name = file_name;
    }

    let body = if state.config.upload_body.is_empty() {
        json!({ "text": format!("extracted: {contents}") }).to_string()
    } else {
        state.config.upload_body.clone()
    };
    reply(state.config.upload_status, body)
}

async fn analyze(State(state): State<BackendState>, mut multipart: Multipart) -> Response {
    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap_or_default();
        fields.insert(name, value);
    }

    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.analyze_calls += 1;
        recorded.last_analyze_fields = fields;
    }

    tokio::time::sleep(state.config.analyze_delay).await;
    reply(state.config.analyze_status, state.config.analyze_body.clone())
}

// ────────────────────────────────────────────────────────────────────────────
// Identity provider
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MockIdentity {
    pub token_status: u16,
    pub logout_status: u16,
    /// Lifetime of issued access tokens, in seconds.
    pub expires_in: i64,
}

impl Default for MockIdentity {
    fn default() -> Self {
        Self {
            token_status: 200,
            logout_status: 204,
            expires_in: 3600,
        }
    }
}

#[derive(Clone)]
struct IdentityState {
    config: Arc<MockIdentity>,
    recorded: Arc<Mutex<Recorded>>,
}

pub async fn mock_identity(config: MockIdentity) -> MockServer {
    let recorded = Arc::new(Mutex::new(Recorded::default()));
    let state = IdentityState {
        config: Arc::new(config),
        recorded: Arc::clone(&recorded),
    };
    let app = Router::new()
        .route("/auth/v1/token", post(token))
        .route("/auth/v1/logout", post(logout))
        .with_state(state);

    MockServer {
        url: serve(app).await,
        recorded,
    }
}

async fn token(
    State(state): State<IdentityState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let grant_type = query.get("grant_type").cloned();
    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.token_calls += 1;
        recorded.last_grant_type = grant_type.clone();
        recorded.last_token_body = Some(body);
        recorded.last_apikey = headers
            .get("apikey")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
    }

    if state.config.token_status != 200 {
        return reply(
            state.config.token_status,
            json!({"error": "invalid_grant", "error_description": "Invalid code"}).to_string(),
        );
    }

    let access_token = match grant_type.as_deref() {
        Some("refresh_token") => "access-refreshed",
        _ => "access-1",
    };
    reply(
        200,
        json!({
            "access_token": access_token,
            "token_type": "bearer",
            "expires_in": state.config.expires_in,
            "expires_at": chrono::Utc::now().timestamp() + state.config.expires_in,
            "refresh_token": "refresh-1",
            "user": {
                "id": TEST_USER_ID,
                "aud": "authenticated",
                "email": "ada@example.com",
                "user_metadata": { "full_name": "Ada Lovelace" }
            }
        })
        .to_string(),
    )
}

async fn logout(State(state): State<IdentityState>, headers: HeaderMap) -> Response {
    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.logout_calls += 1;
        recorded.last_bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
    }
    reply(state.config.logout_status, String::new())
}
