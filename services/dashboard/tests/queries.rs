//! Data-fetch bindings against a scripted backend: in-flight sharing,
//! staleness windows and requests that must never be sent.

mod support;

use std::sync::Arc;

use tokio_test::{assert_err, assert_ok};

use dashboard::models::{ExportFormat, ReportFilter};
use dashboard::reports::{CertificateRow, Facet};
use dashboard::{ApiError, Queries, QueryClient, ReportView};
use support::{BackendState, MockBackend, storage_with};

async fn setup() -> (MockBackend, Queries) {
    let backend = MockBackend::spawn(BackendState::new("token-0")).await;
    let gateway = backend.gateway(storage_with(Some("token-0"), Some("refresh-1")));
    let queries = Queries::new(gateway, Arc::new(QueryClient::new()));
    (backend, queries)
}

#[tokio::test]
async fn test_identical_concurrent_reports_share_one_request() {
    let (backend, queries) = setup().await;
    let filter = ReportFilter::new().with_date_range("2024-04-01", "2024-04-30");

    let (a, b, c) = tokio::join!(
        queries.report("certificates", &filter),
        queries.report("certificates", &filter),
        queries.report("certificates", &filter),
    );

    let a = assert_ok!(a).unwrap();
    assert_eq!(Some(&a), assert_ok!(b).as_ref());
    assert_eq!(Some(&a), assert_ok!(c).as_ref());
    assert_eq!(backend.state.hits_for("/reports/certificates").len(), 1);

    let hit = &backend.state.hits_for("/reports/certificates")[0];
    assert_eq!(hit.params("dateFrom"), vec!["2024-04-01"]);
}

#[tokio::test]
async fn test_reports_are_always_refetched() {
    let (backend, queries) = setup().await;
    let filter = ReportFilter::new();

    queries.report("certificates", &filter).await.unwrap();
    queries.report("certificates", &filter).await.unwrap();

    assert_eq!(backend.state.hits_for("/reports/certificates").len(), 2);
}

#[tokio::test]
async fn test_kpis_reused_within_staleness_window() {
    let (backend, queries) = setup().await;

    let first = queries.kpis(None).await.unwrap();
    let second = queries.kpis(None).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(backend.state.hits_for("/dashboard/kpis").len(), 1);

    queries.cache().clear();
    queries.kpis(None).await.unwrap();
    assert_eq!(backend.state.hits_for("/dashboard/kpis").len(), 2);
}

#[tokio::test]
async fn test_unknown_report_type_sends_nothing() {
    let (backend, queries) = setup().await;

    let err = assert_err!(queries.report("weekly-summary", &ReportFilter::new()).await);

    assert!(matches!(err, ApiError::UnknownReportType(ref name) if name == "weekly-summary"));
    assert!(backend.state.hits().is_empty());
}

#[tokio::test]
async fn test_project_progress_waits_for_date_or_project() {
    let (backend, queries) = setup().await;

    let disabled = queries
        .report("project-progress", &ReportFilter::new())
        .await
        .unwrap();
    assert!(disabled.is_none());
    assert!(backend.state.hits().is_empty());

    let filter = ReportFilter::new().with_project("p-1");
    let enabled = queries.report("project-progress", &filter).await.unwrap();
    assert!(enabled.is_some());
    assert_eq!(backend.state.hits_for("/reports/project-progress").len(), 1);
}

#[tokio::test]
async fn test_export_returns_document_bytes_uncached() {
    let (backend, queries) = setup().await;
    let filter = ReportFilter::new().with_status("Approved");

    let first = queries
        .export_report("certificates", ExportFormat::Pdf, &filter)
        .await
        .unwrap();
    queries
        .export_report("certificates", ExportFormat::Pdf, &filter)
        .await
        .unwrap();

    assert!(first.starts_with(b"%PDF"));
    assert_eq!(backend.state.hits_for("/reports/export/certificates").len(), 2);
}

#[tokio::test]
async fn test_fetched_report_feeds_the_view() {
    let (_backend, queries) = setup().await;

    let report = queries
        .report("certificates", &ReportFilter::new())
        .await
        .unwrap()
        .unwrap();
    let mut view = ReportView::<CertificateRow>::from_report(&report).unwrap();

    assert_eq!(view.summary().count, 2);
    view.select(Facet::Status, "Approved");
    let summary = view.summary();
    assert_eq!(summary.count, 1);
    assert_eq!(summary.total_paid, 300_000.0);
}
