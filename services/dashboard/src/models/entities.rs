//! Read-only backend entities: projects, quantity surveys, certificates,
//! equipment and fuel invoices

use serde::{Deserialize, Serialize};

/// Construction project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    pub status: ProjectStatus,
    #[serde(default)]
    pub total_budget: Option<f64>,
    #[serde(default)]
    pub total_executed: Option<f64>,
    #[serde(default)]
    pub completion_percentage: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
    Cancelled,
}

/// Quantity survey: a measured-quantity billing document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Qs {
    pub id: String,
    pub project_id: String,
    pub qs_number: String,
    #[serde(rename = "type")]
    pub kind: QsType,
    pub date: String,
    pub status: QsStatus,
    #[serde(default)]
    pub items: Vec<QsItem>,
    #[serde(default)]
    pub total_value: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Qs {
    /// Declared total, or the sum of the item totals when none is declared
    pub fn value(&self) -> f64 {
        self.total_value
            .unwrap_or_else(|| self.items.iter().map(|item| item.total_value).sum())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QsType {
    Contract,
    Variation,
    Claim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QsStatus {
    Draft,
    Submitted,
    Approved,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QsItem {
    pub id: String,
    pub qs_id: String,
    pub item_location_id: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_value: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Payment certificate aggregating approved QS items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: String,
    pub pc_number: String,
    pub date: String,
    #[serde(default, rename = "linkedQSIds")]
    pub linked_qs_ids: Vec<String>,
    pub additions: f64,
    pub deductions: f64,
    pub taxes: f64,
    pub insurances: f64,
    pub gross_amount: f64,
    pub net_payable: f64,
    pub status: CertificateStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateStatus {
    Draft,
    Pending,
    Approved,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: EquipmentType,
    #[serde(default)]
    pub rate_per_hour: Option<f64>,
    #[serde(default)]
    pub rate_per_day: Option<f64>,
    pub rent_includes_fuel: bool,
    /// Liters per hour
    #[serde(default)]
    pub fuel_consumption_rate: Option<f64>,
    pub status: EquipmentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquipmentType {
    Excavator,
    Loader,
    Bulldozer,
    Grader,
    Compactor,
    Truck,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquipmentStatus {
    Available,
    InUse,
    Maintenance,
    Retired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelInvoice {
    pub id: String,
    pub supplier: String,
    pub invoice_number: String,
    pub date: String,
    pub total_liters: f64,
    pub total_amount: f64,
    pub price_per_liter: f64,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub allocated_liters: Option<f64>,
    #[serde(default)]
    pub remaining_liters: Option<f64>,
}
