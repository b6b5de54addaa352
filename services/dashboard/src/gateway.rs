//! API gateway: the single HTTP client every backend call goes through
//!
//! Outgoing requests carry the stored access token as a bearer credential
//! and GETs get a `_t` cache-busting nonce. A 401 triggers at most one
//! token refresh and one replay of the failed request. When the session
//! cannot be recovered the stored tokens are cleared and
//! [`AuthEvent::SessionExpired`] is broadcast so the navigation layer can
//! send the user to the login page.

use std::sync::Arc;

use chrono::Utc;
use common::KeyValueStorage;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::DashboardConfig;
use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::session::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// Query parameter carrying the cache-busting nonce
pub const NONCE_PARAM: &str = "_t";

const REFRESH_PATH: &str = "/auth/refresh";
const EVENT_CAPACITY: usize = 16;

/// Authentication lifecycle events emitted by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// Credentials were rejected and could not be refreshed
    SessionExpired,
}

/// A request relative to the API base URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Set once the request has been replayed after a 401
    pub retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Append the fields of `params` as query parameters.
    ///
    /// `params` must serialize to an object; null fields are skipped and
    /// strings are sent without quotes.
    pub fn with_query<T: Serialize + ?Sized>(mut self, params: &T) -> ApiResult<Self> {
        let value = serde_json::to_value(params)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        let fields = match value {
            Value::Object(fields) => fields,
            Value::Null => return Ok(self),
            other => {
                return Err(ApiError::InvalidRequest(format!(
                    "query parameters must be an object, got {}",
                    other
                )));
            }
        };

        for (name, value) in fields {
            let value = match value {
                Value::Null => continue,
                Value::String(s) => s,
                other => other.to_string(),
            };
            self.query.push((name, value));
        }

        Ok(self)
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> ApiResult<Self> {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    token: String,
}

/// HTTP gateway to the reporting backend
pub struct ApiGateway {
    http: Client,
    base_url: String,
    storage: Arc<dyn KeyValueStorage>,
    refresh_lock: Mutex<()>,
    events: broadcast::Sender<AuthEvent>,
}

impl ApiGateway {
    /// Create a gateway for the configured base URL and timeout
    pub fn new(config: &DashboardConfig, storage: Arc<dyn KeyValueStorage>) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(config.api_timeout())
            .default_headers(headers)
            .build()?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        info!(
            "API gateway ready: {} (timeout {:?})",
            config.api_base_url,
            config.api_timeout()
        );

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            storage,
            refresh_lock: Mutex::new(()),
            events,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Receive authentication lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// GET `path` with `params` as query parameters and decode the JSON body
    pub async fn get_json<T, P>(&self, path: &str, params: &P) -> ApiResult<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let request = ApiRequest::get(path).with_query(params)?;
        self.send_json(request).await
    }

    /// POST `body` to `path` and decode the JSON body
    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = ApiRequest::post(path).with_json(body)?;
        self.send_json(request).await
    }

    /// Send `request` and decode its JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let bytes = self.send(request).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send `request` and return the raw response body.
    ///
    /// A 401 on a request that has not been retried yet goes through session
    /// recovery and the request is replayed exactly once.
    pub async fn send(&self, mut request: ApiRequest) -> ApiResult<Vec<u8>> {
        let request_id = Uuid::new_v4();
        let token = self.access_token();

        match self.execute(request_id, &request, token.as_deref()).await {
            Err(err) if err.is_unauthorized() && !request.retried => {
                request.retried = true;
                let token = self.recover_session(token.as_deref(), err).await?;
                debug!("[{}] Replaying {} {}", request_id, request.method, request.path);
                self.execute(request_id, &request, Some(&token)).await
            }
            result => result,
        }
    }

    async fn execute(
        &self,
        request_id: Uuid,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> ApiResult<Vec<u8>> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url);

        let mut query = request.query.clone();
        if request.method == Method::GET {
            query.retain(|(name, _)| name != NONCE_PARAM);
            query.push((NONCE_PARAM.to_string(), Utc::now().timestamp_millis().to_string()));
        }
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!("[{}] {} {}", request_id, request.method, url);

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            debug!("[{}] {} {} -> {}", request_id, request.method, url, status);
            return Err(ApiError::Server {
                status: status.as_u16(),
                body: ErrorBody::from_bytes(&bytes),
            });
        }

        Ok(bytes.to_vec())
    }

    /// Obtain a usable access token after `used` was rejected.
    ///
    /// Refreshes are serialized: when another request already rotated the
    /// token while this one waited, the rotated token is reused without a
    /// second refresh call. On failure the original error is returned.
    async fn recover_session(&self, used: Option<&str>, original: ApiError) -> ApiResult<String> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.access_token() {
            if used != Some(current.as_str()) {
                debug!("Access token already refreshed, reusing it");
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.stored(REFRESH_TOKEN_KEY) else {
            info!("Access token rejected and no refresh token stored");
            self.expire_session();
            return Err(original);
        };

        match self.refresh(&refresh_token).await {
            Ok(token) => {
                info!("Access token refreshed");
                if let Err(e) = self.storage.set_item(ACCESS_TOKEN_KEY, &token) {
                    warn!("Failed to store refreshed access token: {}", e);
                }
                Ok(token)
            }
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                self.expire_session();
                Err(original)
            }
        }
    }

    /// Refresh round trip; bypasses bearer injection and the nonce
    async fn refresh(&self, refresh_token: &str) -> ApiResult<String> {
        let url = format!("{}{}", self.base_url, REFRESH_PATH);
        let response = self
            .http
            .post(&url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                body: ErrorBody::from_bytes(&bytes),
            });
        }

        let RefreshResponse { token } = serde_json::from_slice(&bytes)?;
        if token.is_empty() {
            return Err(ApiError::Decode("refresh response carried an empty token".into()));
        }
        Ok(token)
    }

    fn expire_session(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.storage.remove_item(key) {
                warn!("Failed to remove {}: {}", key, e);
            }
        }
        // No receivers just means nobody is navigating
        let _ = self.events.send(AuthEvent::SessionExpired);
    }

    fn access_token(&self) -> Option<String> {
        self.stored(ACCESS_TOKEN_KEY)
    }

    fn stored(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value.filter(|value| !value.is_empty()),
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }
}
