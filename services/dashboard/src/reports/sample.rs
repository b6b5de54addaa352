//! Bundled sample datasets, used when no backend report is available

use crate::api::ReportType;
use crate::reports::ReportRow;

/// Raw JSON of the bundled dataset for `kind`
pub fn sample_json(kind: ReportType) -> &'static str {
    match kind {
        ReportType::ProjectProgress => include_str!("../../data/project-progress.json"),
        ReportType::EquipmentUtilization => include_str!("../../data/equipment-utilization.json"),
        ReportType::FuelConsumption => include_str!("../../data/fuel-consumption.json"),
        ReportType::Certificates => include_str!("../../data/certificates.json"),
        ReportType::QsSummary => include_str!("../../data/qs-summary.json"),
        ReportType::DirectCosts => include_str!("../../data/direct-costs.json"),
        ReportType::Profitability => include_str!("../../data/profitability.json"),
    }
}

/// Bundled rows of report `R`
pub fn sample_rows<R: ReportRow>() -> serde_json::Result<Vec<R>> {
    serde_json::from_str(sample_json(R::KIND))
}
