//! Fuel consumption report

use serde::{Deserialize, Serialize};

use crate::api::ReportType;
use crate::format::{DEFAULT_CURRENCY, format_currency, format_number};
use crate::models::Language;
use crate::reports::{Facet, ReportRow, id_string};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelRow {
    #[serde(deserialize_with = "id_string::deserialize")]
    pub id: String,
    pub date: String,
    pub equipment_code: String,
    pub equipment_name: String,
    pub fuel_type: String,
    /// Liters
    pub quantity: f64,
    pub unit_price: f64,
    pub total_cost: f64,
    pub project: String,
    pub operator: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuelSummary {
    pub entries: usize,
    pub total_quantity: f64,
    pub total_cost: f64,
    /// Cost per liter; 0 when nothing was dispensed
    pub avg_unit_price: f64,
}

impl ReportRow for FuelRow {
    type Summary = FuelSummary;

    const KIND: ReportType = ReportType::FuelConsumption;
    const FACETS: &'static [Facet] = &[Facet::Project, Facet::Equipment];

    fn facet_value(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Project => Some(self.project.as_str()),
            Facet::Equipment => Some(self.equipment_code.as_str()),
            _ => None,
        }
    }

    fn summarize(rows: &[&Self]) -> Self::Summary {
        let total_quantity: f64 = rows.iter().map(|row| row.quantity).sum();
        let total_cost: f64 = rows.iter().map(|row| row.total_cost).sum();
        FuelSummary {
            entries: rows.len(),
            total_quantity,
            total_cost,
            avg_unit_price: if total_quantity > 0.0 {
                total_cost / total_quantity
            } else {
                0.0
            },
        }
    }

    fn summary_lines(summary: &Self::Summary, language: Language) -> Vec<(&'static str, String)> {
        let labels = match language {
            Language::Ar => ["عدد العمليات", "إجمالي الكمية (لتر)", "إجمالي التكلفة", "متوسط سعر اللتر"],
            Language::En => ["Entries", "Total liters", "Total cost", "Avg price per liter"],
        };
        vec![
            (labels[0], summary.entries.to_string()),
            (labels[1], format_number(summary.total_quantity, 0)),
            (labels[2], format_currency(summary.total_cost, DEFAULT_CURRENCY)),
            (labels[3], format_currency(summary.avg_unit_price, DEFAULT_CURRENCY)),
        ]
    }

    fn headers(language: Language) -> Vec<&'static str> {
        match language {
            Language::Ar => vec![
                "التاريخ", "الكود", "المعدة", "نوع الوقود", "الكمية", "سعر اللتر", "الإجمالي",
                "المشروع", "المشغل",
            ],
            Language::En => vec![
                "Date", "Code", "Equipment", "Fuel", "Liters", "Unit Price", "Total", "Project",
                "Operator",
            ],
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            self.equipment_code.clone(),
            self.equipment_name.clone(),
            self.fuel_type.clone(),
            format_number(self.quantity, 0),
            format_currency(self.unit_price, DEFAULT_CURRENCY),
            format_currency(self.total_cost, DEFAULT_CURRENCY),
            self.project.clone(),
            self.operator.clone(),
        ]
    }
}
