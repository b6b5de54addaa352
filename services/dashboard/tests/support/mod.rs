//! Scripted mock of the reporting backend
//!
//! Every request is recorded with its path, raw query and authorization
//! header. Protected endpoints accept exactly one bearer token, which a
//! successful refresh rotates.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use common::{KeyValueStorage, MemoryStorage};
use dashboard::{ApiGateway, DashboardConfig};

/// One request seen by the backend
#[derive(Debug, Clone)]
pub struct Hit {
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

impl Hit {
    /// Values of query parameter `name`, in order
    pub fn params(&self, name: &str) -> Vec<String> {
        self.query
            .as_deref()
            .unwrap_or_default()
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .filter(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
            .collect()
    }
}

pub struct BackendState {
    valid_token: Mutex<String>,
    hits: Mutex<Vec<Hit>>,
    pub refresh_calls: AtomicUsize,
    /// Refresh answers 401 when false
    pub refresh_ok: AtomicBool,
    /// Protected endpoints answer 401 whatever the token
    pub reject_all: AtomicBool,
    pub refresh_delay: Duration,
    pub report_delay: Duration,
}

impl BackendState {
    pub fn new(valid_token: &str) -> Self {
        Self {
            valid_token: Mutex::new(valid_token.to_string()),
            hits: Mutex::new(Vec::new()),
            refresh_calls: AtomicUsize::new(0),
            refresh_ok: AtomicBool::new(true),
            reject_all: AtomicBool::new(false),
            refresh_delay: Duration::from_millis(100),
            report_delay: Duration::from_millis(100),
        }
    }

    pub fn valid_token(&self) -> String {
        self.valid_token.lock().unwrap().clone()
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    /// Hits whose path ends with `suffix`
    pub fn hits_for(&self, suffix: &str) -> Vec<Hit> {
        self.hits()
            .into_iter()
            .filter(|hit| hit.path.ends_with(suffix))
            .collect()
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn record(&self, uri: &Uri, headers: &HeaderMap) {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.hits.lock().unwrap().push(Hit {
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            authorization,
        });
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        if self.reject_all.load(Ordering::SeqCst) {
            return false;
        }
        let expected = format!("Bearer {}", self.valid_token());
        headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()) == Some(expected.as_str())
    }
}

pub struct MockBackend {
    pub state: Arc<BackendState>,
    pub base_url: String,
}

impl MockBackend {
    /// Serve `state` on an ephemeral local port
    pub async fn spawn(state: BackendState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/api/auth/refresh", post(refresh))
            .route("/api/dashboard/kpis", get(kpis))
            .route("/api/projects", get(projects))
            .route("/api/certificates", get(invalid_certificates))
            .route("/api/reports/:slug", get(report))
            .route("/api/reports/export/:slug", post(export))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            base_url: format!("http://{}/api", addr),
        }
    }

    pub fn gateway(&self, storage: Arc<dyn KeyValueStorage>) -> Arc<ApiGateway> {
        let config = DashboardConfig::for_base_url(&self.base_url);
        Arc::new(ApiGateway::new(&config, storage).unwrap())
    }
}

/// Memory storage holding the given raw token keys
pub fn storage_with(access: Option<&str>, refresh: Option<&str>) -> Arc<dyn KeyValueStorage> {
    let storage = MemoryStorage::new();
    if let Some(token) = access {
        storage.set_item("accessToken", token).unwrap();
    }
    if let Some(token) = refresh {
        storage.set_item("refreshToken", token).unwrap();
    }
    Arc::new(storage)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Unauthorized"})),
    )
        .into_response()
}

async fn refresh(
    State(state): State<Arc<BackendState>>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(&uri, &headers);
    let call = state.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
    tokio::time::sleep(state.refresh_delay).await;

    if !state.refresh_ok.load(Ordering::SeqCst) || body["refreshToken"].as_str().is_none() {
        return unauthorized();
    }

    let token = format!("token-{}", call);
    *state.valid_token.lock().unwrap() = token.clone();
    Json(json!({ "token": token })).into_response()
}

async fn kpis(State(state): State<Arc<BackendState>>, uri: Uri, headers: HeaderMap) -> Response {
    state.record(&uri, &headers);
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "executedValue": 6875000,
        "outstandingQSValue": 165000,
        "openItemsCount": 4,
        "fuelConsumptionMonthly": 1970,
        "equipmentUtilization": 72.2,
        "netProfit": 1430000
    }))
    .into_response()
}

async fn projects(State(state): State<Arc<BackendState>>, uri: Uri, headers: HeaderMap) -> Response {
    state.record(&uri, &headers);
    Json(json!([])).into_response()
}

async fn invalid_certificates(
    State(state): State<Arc<BackendState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    state.record(&uri, &headers);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "message": "Validation failed",
            "errors": {"dateFrom": ["تاريخ البداية مطلوب"]}
        })),
    )
        .into_response()
}

async fn report(State(state): State<Arc<BackendState>>, uri: Uri, headers: HeaderMap) -> Response {
    state.record(&uri, &headers);
    if !state.authorized(&headers) {
        return unauthorized();
    }
    tokio::time::sleep(state.report_delay).await;

    let data = if uri.path().ends_with("/certificates") {
        json!([
            {
                "id": 1,
                "certificateNumber": "CERT-2024-101",
                "qsNumber": "QS-2024-201",
                "project": "مشروع الجسر",
                "description": "أعمال الخرسانة",
                "date": "2024-04-01",
                "amount": 300000,
                "paidAmount": 300000,
                "status": "Approved",
                "paymentStatus": "Paid",
                "approvedBy": "م. سامي يوسف"
            },
            {
                "id": 2,
                "certificateNumber": "CERT-2024-102",
                "qsNumber": "QS-2024-202",
                "project": "مشروع الساحة",
                "description": "أعمال التبليط",
                "date": "2024-04-10",
                "amount": 120000,
                "paidAmount": 0,
                "status": "Pending",
                "paymentStatus": "Unpaid"
            }
        ])
    } else {
        json!([])
    };

    Json(json!({
        "title": "report",
        "generatedAt": "2024-04-15T09:00:00Z",
        "data": data
    }))
    .into_response()
}

async fn export(State(state): State<Arc<BackendState>>, uri: Uri, headers: HeaderMap) -> Response {
    state.record(&uri, &headers);
    if !state.authorized(&headers) {
        return unauthorized();
    }
    (
        [(CONTENT_TYPE, "application/pdf")],
        Bytes::from_static(b"%PDF-1.4 report"),
    )
        .into_response()
}
