//! Typed backend endpoints
//!
//! Thin wrappers over [`ApiGateway`]: one method per endpoint, filters sent
//! as query parameters, JSON bodies decoded into the models.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::gateway::{ApiGateway, ApiRequest};
use crate::models::{
    Certificate, DashboardData, Equipment, ExportFormat, ExportRequest, FuelInvoice, Kpis,
    Language, Project, Qs, ReportData, ReportFilter,
};

/// The seven report kinds served under `/reports/{slug}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportType {
    ProjectProgress,
    EquipmentUtilization,
    FuelConsumption,
    Certificates,
    QsSummary,
    DirectCosts,
    Profitability,
}

impl ReportType {
    pub const ALL: [ReportType; 7] = [
        ReportType::ProjectProgress,
        ReportType::EquipmentUtilization,
        ReportType::FuelConsumption,
        ReportType::Certificates,
        ReportType::QsSummary,
        ReportType::DirectCosts,
        ReportType::Profitability,
    ];

    /// Path segment and cache key component
    pub fn slug(self) -> &'static str {
        match self {
            ReportType::ProjectProgress => "project-progress",
            ReportType::EquipmentUtilization => "equipment-utilization",
            ReportType::FuelConsumption => "fuel-consumption",
            ReportType::Certificates => "certificates",
            ReportType::QsSummary => "qs-summary",
            ReportType::DirectCosts => "direct-costs",
            ReportType::Profitability => "profitability",
        }
    }

    pub fn title(self, language: Language) -> &'static str {
        match (self, language) {
            (ReportType::ProjectProgress, Language::Ar) => "تقرير تقدم المشاريع",
            (ReportType::ProjectProgress, Language::En) => "Project Progress Report",
            (ReportType::EquipmentUtilization, Language::Ar) => "تقرير استخدام المعدات",
            (ReportType::EquipmentUtilization, Language::En) => "Equipment Utilization Report",
            (ReportType::FuelConsumption, Language::Ar) => "تقرير استهلاك الوقود",
            (ReportType::FuelConsumption, Language::En) => "Fuel Consumption Report",
            (ReportType::Certificates, Language::Ar) => "تقرير المستخلصات",
            (ReportType::Certificates, Language::En) => "Certificates Report",
            (ReportType::QsSummary, Language::Ar) => "تقرير ملخص الكميات (QS)",
            (ReportType::QsSummary, Language::En) => "QS Summary Report",
            (ReportType::DirectCosts, Language::Ar) => "تقرير التكاليف المباشرة",
            (ReportType::DirectCosts, Language::En) => "Direct Costs Report",
            (ReportType::Profitability, Language::Ar) => "تقرير الربحية",
            (ReportType::Profitability, Language::En) => "Profitability Report",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ReportType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportType::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| ApiError::UnknownReportType(s.to_string()))
    }
}

/// Endpoint client; cheap to clone
#[derive(Clone)]
pub struct DashboardApi {
    gateway: Arc<ApiGateway>,
}

impl DashboardApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<ApiGateway> {
        &self.gateway
    }

    pub async fn dashboard(&self, filters: Option<&ReportFilter>) -> ApiResult<DashboardData> {
        self.gateway.get_json("/dashboard", &filters).await
    }

    pub async fn kpis(&self, filters: Option<&ReportFilter>) -> ApiResult<Kpis> {
        self.gateway.get_json("/dashboard/kpis", &filters).await
    }

    pub async fn report(&self, kind: ReportType, filters: &ReportFilter) -> ApiResult<ReportData> {
        let path = format!("/reports/{}", kind.slug());
        self.gateway.get_json(&path, filters).await
    }

    /// Request a rendered export of a report; the body is returned as is
    pub async fn export_report(
        &self,
        kind: ReportType,
        format: ExportFormat,
        filters: &ReportFilter,
    ) -> ApiResult<Vec<u8>> {
        let request = ApiRequest::post(format!("/reports/export/{}", kind.slug()))
            .with_json(&ExportRequest { format, filters })?;
        self.gateway.send(request).await
    }

    pub async fn projects<P: Serialize + ?Sized>(&self, filters: &P) -> ApiResult<Vec<Project>> {
        self.gateway.get_json("/projects", filters).await
    }

    pub async fn project(&self, id: &str) -> ApiResult<Project> {
        self.gateway.get_json(&entity_path("projects", id)?, &()).await
    }

    pub async fn qs_list<P: Serialize + ?Sized>(&self, filters: &P) -> ApiResult<Vec<Qs>> {
        self.gateway.get_json("/qs", filters).await
    }

    pub async fn qs(&self, id: &str) -> ApiResult<Qs> {
        self.gateway.get_json(&entity_path("qs", id)?, &()).await
    }

    pub async fn certificates<P: Serialize + ?Sized>(
        &self,
        filters: &P,
    ) -> ApiResult<Vec<Certificate>> {
        self.gateway.get_json("/certificates", filters).await
    }

    pub async fn certificate(&self, id: &str) -> ApiResult<Certificate> {
        self.gateway.get_json(&entity_path("certificates", id)?, &()).await
    }

    pub async fn equipment<P: Serialize + ?Sized>(&self, filters: &P) -> ApiResult<Vec<Equipment>> {
        self.gateway.get_json("/equipment", filters).await
    }

    pub async fn equipment_by_id(&self, id: &str) -> ApiResult<Equipment> {
        self.gateway.get_json(&entity_path("equipment", id)?, &()).await
    }

    pub async fn fuel_invoices<P: Serialize + ?Sized>(
        &self,
        filters: &P,
    ) -> ApiResult<Vec<FuelInvoice>> {
        self.gateway.get_json("/fuel-invoices", filters).await
    }

    pub async fn fuel_invoice(&self, id: &str) -> ApiResult<FuelInvoice> {
        self.gateway.get_json(&entity_path("fuel-invoices", id)?, &()).await
    }

    pub async fn analytics(&self, filters: &ReportFilter) -> ApiResult<Value> {
        self.gateway.get_json("/analytics", filters).await
    }

    pub async fn timeline(&self, filters: &ReportFilter) -> ApiResult<Value> {
        self.gateway.get_json("/analytics/timeline", filters).await
    }
}

/// `/{resource}/{id}` with `id` percent-encoded as a single path segment
fn entity_path(resource: &str, id: &str) -> ApiResult<String> {
    if matches!(id, "" | "." | "..") {
        return Err(ApiError::InvalidRequest(format!("invalid {} id: {:?}", resource, id)));
    }

    let mut url = Url::parse("http://localhost/").map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidRequest("base cannot hold a path".into()))?
        .clear()
        .push(resource)
        .push(id);
    Ok(url.path().to_string())
}
