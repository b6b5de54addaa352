//! Dashboard KPI, chart and alert models

use serde::{Deserialize, Serialize};

/// Payload of the dashboard endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub kpis: Kpis,
    pub charts: Charts,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

/// Headline figures shown in the KPI cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub executed_value: f64,
    #[serde(rename = "outstandingQSValue")]
    pub outstanding_qs_value: f64,
    pub open_items_count: u32,
    pub fuel_consumption_monthly: f64,
    pub equipment_utilization: f64,
    pub net_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
    pub project_progress: Vec<ProjectProgressPoint>,
    pub items_status: ItemsStatus,
    pub fuel_trend: Vec<FuelTrendPoint>,
    pub cost_vs_revenue: Vec<CostRevenuePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProgressPoint {
    pub project_name: String,
    pub completion_percentage: f64,
    pub executed_value: f64,
    pub planned_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemsStatus {
    pub open: u32,
    pub closed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelTrendPoint {
    pub month: String,
    pub consumption: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRevenuePoint {
    pub month: String,
    pub cost: f64,
    pub revenue: f64,
}

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Info,
    Warning,
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertAction {
    pub label: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub date: String,
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<AlertAction>,
}

impl DashboardData {
    /// Number of alerts not yet read
    pub fn unread_alerts(&self) -> usize {
        self.alerts.iter().filter(|alert| !alert.read).count()
    }
}
