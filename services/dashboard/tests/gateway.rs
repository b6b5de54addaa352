//! Gateway behaviour against a scripted backend: bearer injection, the
//! cache-busting nonce and the single refresh-retry on 401.

mod support;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::TcpListener;

use dashboard::error::handle_api_error;
use dashboard::models::Kpis;
use dashboard::{ApiError, ApiGateway, AuthEvent, DashboardConfig};
use support::{BackendState, MockBackend, storage_with};

#[tokio::test]
async fn test_bearer_injected_and_nonce_replaced() {
    let backend = MockBackend::spawn(BackendState::new("token-0")).await;
    let gateway = backend.gateway(storage_with(Some("token-0"), None));

    let kpis: Kpis = gateway
        .get_json("/dashboard/kpis", &json!({"_t": "stale", "projectId": "p-1"}))
        .await
        .unwrap();
    assert_eq!(kpis.open_items_count, 4);

    let hits = backend.state.hits_for("/dashboard/kpis");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].authorization.as_deref(), Some("Bearer token-0"));
    assert_eq!(hits[0].params("projectId"), vec!["p-1"]);

    let nonce = hits[0].params("_t");
    assert_eq!(nonce.len(), 1);
    assert_ne!(nonce[0], "stale");
    assert!(nonce[0].parse::<i64>().unwrap() > 0);
}

#[tokio::test]
async fn test_no_header_without_token() {
    let backend = MockBackend::spawn(BackendState::new("token-0")).await;
    let gateway = backend.gateway(storage_with(None, None));

    let projects: Vec<Value> = gateway.get_json("/projects", &()).await.unwrap();
    assert!(projects.is_empty());

    let hits = backend.state.hits_for("/projects");
    assert_eq!(hits[0].authorization, None);
    assert_eq!(hits[0].params("_t").len(), 1);
}

#[tokio::test]
async fn test_expired_token_refreshed_and_request_replayed() {
    let backend = MockBackend::spawn(BackendState::new("token-0")).await;
    let storage = storage_with(Some("expired"), Some("refresh-1"));
    let gateway = backend.gateway(Arc::clone(&storage));

    let kpis: Kpis = gateway.get_json("/dashboard/kpis", &()).await.unwrap();
    assert_eq!(kpis.open_items_count, 4);

    assert_eq!(backend.state.refresh_count(), 1);
    let hits = backend.state.hits_for("/dashboard/kpis");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].authorization.as_deref(), Some("Bearer expired"));
    assert_eq!(hits[1].authorization.as_deref(), Some("Bearer token-1"));

    assert_eq!(storage.get_item("accessToken").unwrap(), Some("token-1".into()));
    assert_eq!(storage.get_item("refreshToken").unwrap(), Some("refresh-1".into()));
}

#[tokio::test]
async fn test_missing_refresh_token_expires_session() {
    let backend = MockBackend::spawn(BackendState::new("token-0")).await;
    let storage = storage_with(Some("expired"), None);
    let gateway = backend.gateway(Arc::clone(&storage));
    let mut events = gateway.subscribe();

    let result: Result<Kpis, _> = gateway.get_json("/dashboard/kpis", &()).await;

    let err = result.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(backend.state.refresh_count(), 0);
    assert_eq!(backend.state.hits_for("/dashboard/kpis").len(), 1);
    assert_eq!(events.try_recv().unwrap(), AuthEvent::SessionExpired);
    assert_eq!(storage.get_item("accessToken").unwrap(), None);
}

#[tokio::test]
async fn test_failed_refresh_clears_tokens() {
    let state = BackendState::new("token-0");
    state.refresh_ok.store(false, Ordering::SeqCst);
    let backend = MockBackend::spawn(state).await;
    let storage = storage_with(Some("expired"), Some("revoked"));
    let gateway = backend.gateway(Arc::clone(&storage));
    let mut events = gateway.subscribe();

    let result: Result<Kpis, _> = gateway.get_json("/dashboard/kpis", &()).await;

    // The caller sees the original 401, not the refresh failure
    assert!(result.unwrap_err().is_unauthorized());
    assert_eq!(backend.state.refresh_count(), 1);
    assert_eq!(events.try_recv().unwrap(), AuthEvent::SessionExpired);
    assert_eq!(storage.get_item("accessToken").unwrap(), None);
    assert_eq!(storage.get_item("refreshToken").unwrap(), None);
}

#[tokio::test]
async fn test_replayed_request_is_not_retried_again() {
    let state = BackendState::new("token-0");
    state.reject_all.store(true, Ordering::SeqCst);
    let backend = MockBackend::spawn(state).await;
    let gateway = backend.gateway(storage_with(Some("token-0"), Some("refresh-1")));

    let result: Result<Kpis, _> = gateway.get_json("/dashboard/kpis", &()).await;

    assert!(result.unwrap_err().is_unauthorized());
    assert_eq!(backend.state.refresh_count(), 1);
    assert_eq!(backend.state.hits_for("/dashboard/kpis").len(), 2);
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let backend = MockBackend::spawn(BackendState::new("token-0")).await;
    let storage = storage_with(Some("expired"), Some("refresh-1"));
    let gateway = backend.gateway(Arc::clone(&storage));

    let (a, b, c) = tokio::join!(
        gateway.get_json::<Kpis, _>("/dashboard/kpis", &()),
        gateway.get_json::<Kpis, _>("/dashboard/kpis", &()),
        gateway.get_json::<Kpis, _>("/dashboard/kpis", &()),
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(backend.state.refresh_count(), 1);
    assert_eq!(storage.get_item("accessToken").unwrap(), Some("token-1".into()));
}

#[tokio::test]
async fn test_validation_errors_become_display_messages() {
    let backend = MockBackend::spawn(BackendState::new("token-0")).await;
    let gateway = backend.gateway(storage_with(Some("token-0"), None));

    let err = gateway
        .get_json::<Value, _>("/certificates", &())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert_eq!(handle_api_error(&err), "تاريخ البداية مطلوب");
}

#[tokio::test]
async fn test_unreachable_backend_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = DashboardConfig::for_base_url(format!("http://{}/api", addr));
    config.api_timeout_ms = Duration::from_secs(2).as_millis() as u64;
    let gateway = ApiGateway::new(&config, storage_with(None, None)).unwrap();

    let err = gateway
        .get_json::<Value, _>("/projects", &())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(handle_api_error(&err), "خطأ في الاتصال. تحقق من الإنترنت.");
}
