//! Keyed query cache with staleness windows and in-flight sharing
//!
//! A fetch for a key that already has a pending request joins that request
//! instead of issuing a new one. Successful results are kept with their
//! fetch instant and reused while younger than the caller's staleness
//! window. Failures are never cached, results fetched with a zero staleness
//! window are not kept, and completed entries older than the retention
//! window are dropped whenever a new result is stored.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};

/// How long a completed result is kept after it was fetched
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(5 * 60);

type Payload = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<Payload, ApiError>>>;

/// Cache key: resource path plus canonical JSON of the parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    resource: Vec<String>,
    params: String,
}

impl QueryKey {
    pub fn new<I, S>(resource: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resource: resource.into_iter().map(Into::into).collect(),
            params: Value::Null.to_string(),
        }
    }

    /// Attach parameters; object keys are sorted so that equal parameter
    /// sets always produce equal keys.
    #[must_use]
    pub fn with_params<P: Serialize + ?Sized>(mut self, params: &P) -> Self {
        let value = serde_json::to_value(params).unwrap_or_else(|e| {
            warn!("Query parameters not serializable, keying on null: {}", e);
            Value::Null
        });
        self.params = canonical(value).to_string();
        self
    }

    pub fn resource(&self) -> &[String] {
        &self.resource
    }

    /// True when this key's resource path begins with `prefix`
    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        prefix.len() <= self.resource.len()
            && self.resource.iter().zip(prefix).all(|(part, want)| part == want)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}?{}", self.resource.join("/"), self.params)
    }
}

fn canonical(value: Value) -> Value {
    match value {
        Value::Object(fields) => {
            let mut fields: Vec<(String, Value)> = fields.into_iter().collect();
            fields.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, canonical(value)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonical).collect()),
        other => other,
    }
}

enum Slot {
    Pending { id: u64, fetch: SharedFetch },
    Ready { value: Payload, fetched_at: Instant },
}

/// Query cache shared by every data binding
pub struct QueryClient {
    entries: Mutex<HashMap<QueryKey, Slot>>,
    next_id: AtomicU64,
    retention: Duration,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client that drops completed results once they are older than `retention`
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            retention,
        }
    }

    /// Return the cached value for `key` when it is younger than
    /// `stale_time`, join an in-flight fetch for the same key, or start a
    /// new fetch with `fetcher`.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, stale_time: Duration, fetcher: F) -> ApiResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        let (id, fetch) = {
            let mut entries = self.lock();
            match entries.get(&key) {
                Some(Slot::Ready { value, fetched_at }) if fetched_at.elapsed() < stale_time => {
                    debug!("Query cache hit: {}", key);
                    return downcast(&key, value);
                }
                Some(Slot::Pending { id, fetch }) => {
                    debug!("Joining in-flight query: {}", key);
                    (*id, fetch.clone())
                }
                _ => {
                    debug!("Fetching query: {}", key);
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let fetch = fetcher()
                        .map(|result| result.map(|value| Arc::new(value) as Payload))
                        .boxed()
                        .shared();
                    entries.insert(
                        key.clone(),
                        Slot::Pending {
                            id,
                            fetch: fetch.clone(),
                        },
                    );
                    (id, fetch)
                }
            }
        };

        let result = fetch.await;

        {
            let mut entries = self.lock();
            let still_pending =
                matches!(entries.get(&key), Some(Slot::Pending { id: current, .. }) if *current == id);
            if still_pending {
                match &result {
                    Ok(_) if stale_time.is_zero() => {
                        entries.remove(&key);
                    }
                    Ok(value) => {
                        evict_expired(&mut entries, self.retention);
                        entries.insert(
                            key.clone(),
                            Slot::Ready {
                                value: Arc::clone(value),
                                fetched_at: Instant::now(),
                            },
                        );
                    }
                    Err(e) => {
                        debug!("Query failed, not cached: {}: {}", key, e);
                        entries.remove(&key);
                    }
                }
            }
        }

        downcast(&key, &result?)
    }

    /// Drop every entry whose resource path begins with `prefix`.
    ///
    /// In-flight fetches still resolve for their callers but their results
    /// are not stored.
    pub fn invalidate(&self, prefix: &[&str]) {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        debug!(
            "Invalidated {} queries under {}",
            before - entries.len(),
            prefix.join("/")
        );
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// True when a completed result is held for `key`, regardless of age
    pub fn is_cached(&self, key: &QueryKey) -> bool {
        matches!(self.lock().get(key), Some(Slot::Ready { .. }))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Slot>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Drop completed entries fetched more than `retention` ago
fn evict_expired(entries: &mut HashMap<QueryKey, Slot>, retention: Duration) {
    let before = entries.len();
    entries.retain(|_, slot| match slot {
        Slot::Pending { .. } => true,
        Slot::Ready { fetched_at, .. } => fetched_at.elapsed() < retention,
    });
    let evicted = before - entries.len();
    if evicted > 0 {
        debug!("Evicted {} expired queries", evicted);
    }
}

fn downcast<T: Clone + 'static>(key: &QueryKey, value: &Payload) -> ApiResult<T> {
    value
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| ApiError::Decode(format!("cached value for {} has a different type", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use serde_json::json;

    fn counting(calls: &Arc<AtomicUsize>, value: u32) -> impl Future<Output = ApiResult<u32>> + Send + 'static {
        let calls = Arc::clone(calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(value)
        }
    }

    #[test]
    fn test_key_params_are_canonical() {
        let a = QueryKey::new(["report", "certificates"])
            .with_params(&json!({"status": "Approved", "projectId": "p-1"}));
        let b = QueryKey::new(["report", "certificates"])
            .with_params(&json!({"projectId": "p-1", "status": "Approved"}));
        let c = QueryKey::new(["report", "certificates"]).with_params(&json!({"projectId": "p-2"}));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with(&["report"]));
        assert!(!a.starts_with(&["report", "qs-summary"]));
    }

    #[tokio::test]
    async fn test_fresh_result_is_reused() {
        let client = QueryClient::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new(["projects"]);

        let first = client
            .fetch(key.clone(), Duration::from_secs(300), || counting(&calls, 1))
            .await
            .unwrap();
        let second = client
            .fetch(key.clone(), Duration::from_secs(300), || counting(&calls, 2))
            .await
            .unwrap();

        assert_eq!((first, second), (1, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(client.is_cached(&key));
    }

    #[tokio::test]
    async fn test_zero_stale_time_always_refetches() {
        let client = QueryClient::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new(["qs-list"]);

        client.fetch(key.clone(), Duration::ZERO, || counting(&calls, 1)).await.unwrap();
        let second = client
            .fetch(key.clone(), Duration::ZERO, || counting(&calls, 2))
            .await
            .unwrap();

        assert_eq!(second, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_stale_results_are_not_retained() {
        let client = QueryClient::new();

        for page in 1..=500_u32 {
            let key = QueryKey::new(["report", "certificates"])
                .with_params(&json!({"dateFrom": "2024-01-01", "page": page}));
            let value = client
                .fetch(key, Duration::ZERO, move || async move { Ok(page) })
                .await
                .unwrap();
            assert_eq!(value, page);
        }

        assert!(client.is_empty());
    }

    #[tokio::test]
    async fn test_expired_entries_evicted_on_insert() {
        let client = QueryClient::with_retention(Duration::from_millis(50));
        let stale = Duration::from_secs(300);
        let old = QueryKey::new(["projects"]);
        let new = QueryKey::new(["equipment"]);

        client.fetch(old.clone(), stale, || async { Ok(1_u32) }).await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        client.fetch(new.clone(), stale, || async { Ok(2_u32) }).await.unwrap();

        assert_eq!(client.len(), 1);
        assert!(!client.is_cached(&old));
        assert!(client.is_cached(&new));
    }

    #[tokio::test]
    async fn test_concurrent_identical_fetches_share_one_request() {
        let client = QueryClient::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new(["report", "certificates"]);

        let (a, b, c) = tokio::join!(
            client.fetch(key.clone(), Duration::ZERO, || counting(&calls, 7)),
            client.fetch(key.clone(), Duration::ZERO, || counting(&calls, 8)),
            client.fetch(key.clone(), Duration::ZERO, || counting(&calls, 9)),
        );

        assert_eq!((a.unwrap(), b.unwrap(), c.unwrap()), (7, 7, 7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let client = QueryClient::new();
        let key = QueryKey::new(["equipment"]);

        let result: ApiResult<u32> = client
            .fetch(key.clone(), Duration::from_secs(300), || async {
                Err(ApiError::Network("connection refused".into()))
            })
            .await;
        assert!(matches!(result, Err(ApiError::Network(_))));
        assert!(client.is_empty());

        let calls = Arc::new(AtomicUsize::new(0));
        let value = client
            .fetch(key, Duration::from_secs(300), || counting(&calls, 3))
            .await
            .unwrap();
        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_by_prefix() {
        let client = QueryClient::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let stale = Duration::from_secs(300);

        for key in [
            QueryKey::new(["report", "certificates"]),
            QueryKey::new(["report", "profitability"]),
            QueryKey::new(["projects"]),
        ] {
            client.fetch(key, stale, || counting(&calls, 1)).await.unwrap();
        }
        assert_eq!(client.len(), 3);

        client.invalidate(&["report"]);
        assert_eq!(client.len(), 1);
        assert!(client.is_cached(&QueryKey::new(["projects"])));

        client.clear();
        assert!(client.is_empty());
    }

    #[tokio::test]
    async fn test_type_mismatch_is_a_decode_error() {
        let client = QueryClient::new();
        let key = QueryKey::new(["kpis"]);
        let stale = Duration::from_secs(60);

        client
            .fetch(key.clone(), stale, || async { Ok(1_u32) })
            .await
            .unwrap();
        let result: ApiResult<String> = client
            .fetch(key, stale, || async { Ok(String::new()) })
            .await;

        assert!(matches!(result, Err(ApiError::Decode(_))));
    }
}
