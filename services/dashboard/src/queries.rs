//! Cached data bindings used by the views
//!
//! Each binding fixes a cache key shape, a staleness window and an enabled
//! rule. A disabled binding resolves to `Ok(None)` without touching the
//! network.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::api::{DashboardApi, ReportType};
use crate::error::{ApiError, ApiResult};
use crate::gateway::ApiGateway;
use crate::models::{
    Certificate, DashboardData, Equipment, ExportFormat, FuelInvoice, Kpis, Project, Qs,
    ReportData, ReportFilter,
};
use crate::query::{QueryClient, QueryKey};

pub const DASHBOARD_STALE_TIME: Duration = Duration::from_secs(2 * 60);
pub const KPIS_STALE_TIME: Duration = Duration::from_secs(60);
/// Projects and equipment change rarely
pub const REFERENCE_STALE_TIME: Duration = Duration::from_secs(5 * 60);
/// Reports and transactional lists are refetched on every request
pub const ALWAYS_STALE: Duration = Duration::ZERO;

/// Project progress needs a start date or a project to be meaningful
pub fn report_enabled(kind: ReportType, filters: &ReportFilter) -> bool {
    match kind {
        ReportType::ProjectProgress => filters.date_from.is_some() || filters.project_id.is_some(),
        _ => true,
    }
}

/// Data bindings over a shared query cache
#[derive(Clone)]
pub struct Queries {
    api: DashboardApi,
    cache: Arc<QueryClient>,
}

impl Queries {
    pub fn new(gateway: Arc<ApiGateway>, cache: Arc<QueryClient>) -> Self {
        Self {
            api: DashboardApi::new(gateway),
            cache,
        }
    }

    pub fn api(&self) -> &DashboardApi {
        &self.api
    }

    pub fn cache(&self) -> &Arc<QueryClient> {
        &self.cache
    }

    pub async fn dashboard(&self, filters: Option<&ReportFilter>) -> ApiResult<DashboardData> {
        let key = QueryKey::new(["dashboard"]).with_params(&filters);
        let api = self.api.clone();
        let filters = filters.cloned();
        self.cache
            .fetch(key, DASHBOARD_STALE_TIME, move || async move {
                api.dashboard(filters.as_ref()).await
            })
            .await
    }

    pub async fn kpis(&self, filters: Option<&ReportFilter>) -> ApiResult<Kpis> {
        let key = QueryKey::new(["kpis"]).with_params(&filters);
        let api = self.api.clone();
        let filters = filters.cloned();
        self.cache
            .fetch(key, KPIS_STALE_TIME, move || async move {
                api.kpis(filters.as_ref()).await
            })
            .await
    }

    pub async fn projects<P: Serialize + ?Sized>(&self, filters: &P) -> ApiResult<Vec<Project>> {
        let params = to_params(filters)?;
        let key = QueryKey::new(["projects"]).with_params(&params);
        let api = self.api.clone();
        self.cache
            .fetch(key, REFERENCE_STALE_TIME, move || async move {
                api.projects(&params).await
            })
            .await
    }

    /// Single project; disabled for an empty id
    pub async fn project(&self, id: &str) -> ApiResult<Option<Project>> {
        if id.is_empty() {
            return Ok(None);
        }

        let key = QueryKey::new(["project", id]);
        let api = self.api.clone();
        let id = id.to_string();
        self.cache
            .fetch(key, REFERENCE_STALE_TIME, move || async move {
                api.project(&id).await
            })
            .await
            .map(Some)
    }

    pub async fn qs_list<P: Serialize + ?Sized>(&self, filters: &P) -> ApiResult<Vec<Qs>> {
        let params = to_params(filters)?;
        let key = QueryKey::new(["qs-list"]).with_params(&params);
        let api = self.api.clone();
        self.cache
            .fetch(key, ALWAYS_STALE, move || async move {
                api.qs_list(&params).await
            })
            .await
    }

    pub async fn certificates<P: Serialize + ?Sized>(
        &self,
        filters: &P,
    ) -> ApiResult<Vec<Certificate>> {
        let params = to_params(filters)?;
        let key = QueryKey::new(["certificates"]).with_params(&params);
        let api = self.api.clone();
        self.cache
            .fetch(key, ALWAYS_STALE, move || async move {
                api.certificates(&params).await
            })
            .await
    }

    pub async fn equipment<P: Serialize + ?Sized>(&self, filters: &P) -> ApiResult<Vec<Equipment>> {
        let params = to_params(filters)?;
        let key = QueryKey::new(["equipment"]).with_params(&params);
        let api = self.api.clone();
        self.cache
            .fetch(key, REFERENCE_STALE_TIME, move || async move {
                api.equipment(&params).await
            })
            .await
    }

    pub async fn fuel_invoices<P: Serialize + ?Sized>(
        &self,
        filters: &P,
    ) -> ApiResult<Vec<FuelInvoice>> {
        let params = to_params(filters)?;
        let key = QueryKey::new(["fuel-invoices"]).with_params(&params);
        let api = self.api.clone();
        self.cache
            .fetch(key, ALWAYS_STALE, move || async move {
                api.fuel_invoices(&params).await
            })
            .await
    }

    /// Report by its slug.
    ///
    /// Unknown slugs fail with [`ApiError::UnknownReportType`] before any
    /// request is made.
    pub async fn report(
        &self,
        type_name: &str,
        filters: &ReportFilter,
    ) -> ApiResult<Option<ReportData>> {
        let kind: ReportType = type_name.parse()?;
        self.report_of(kind, filters).await
    }

    /// Report of a known kind; `None` while the binding is disabled
    pub async fn report_of(
        &self,
        kind: ReportType,
        filters: &ReportFilter,
    ) -> ApiResult<Option<ReportData>> {
        if !report_enabled(kind, filters) {
            return Ok(None);
        }

        let key = QueryKey::new(["report", kind.slug()]).with_params(filters);
        let api = self.api.clone();
        let filters = filters.clone();
        self.cache
            .fetch(key, ALWAYS_STALE, move || async move {
                api.report(kind, &filters).await
            })
            .await
            .map(Some)
    }

    /// Export bypasses the cache: every call produces a fresh document
    pub async fn export_report(
        &self,
        type_name: &str,
        format: ExportFormat,
        filters: &ReportFilter,
    ) -> ApiResult<Vec<u8>> {
        let kind: ReportType = type_name.parse()?;
        self.api.export_report(kind, format, filters).await
    }

    pub async fn analytics(&self, filters: &ReportFilter) -> ApiResult<Value> {
        let key = QueryKey::new(["analytics"]).with_params(filters);
        let api = self.api.clone();
        let filters = filters.clone();
        self.cache
            .fetch(key, ALWAYS_STALE, move || async move {
                api.analytics(&filters).await
            })
            .await
    }

    pub async fn timeline(&self, filters: &ReportFilter) -> ApiResult<Value> {
        let key = QueryKey::new(["timeline"]).with_params(filters);
        let api = self.api.clone();
        let filters = filters.clone();
        self.cache
            .fetch(key, ALWAYS_STALE, move || async move {
                api.timeline(&filters).await
            })
            .await
    }

    /// Forget every cached report
    pub fn invalidate_reports(&self) {
        self.cache.invalidate(&["report"]);
    }
}

fn to_params<P: Serialize + ?Sized>(filters: &P) -> ApiResult<Value> {
    serde_json::to_value(filters).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}
