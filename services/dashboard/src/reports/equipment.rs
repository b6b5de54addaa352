//! Equipment utilization report

use serde::{Deserialize, Serialize};

use crate::api::ReportType;
use crate::format::{DEFAULT_CURRENCY, format_currency, format_percentage};
use crate::models::Language;
use crate::reports::{Facet, ReportRow, id_string, mean};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentRow {
    #[serde(deserialize_with = "id_string::deserialize")]
    pub id: String,
    pub equipment_name: String,
    pub equipment_code: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub hours_used: f64,
    pub total_hours: f64,
    /// Percent of available hours in use
    pub utilization_rate: f64,
    pub project: String,
    pub status: String,
    pub fuel_cost: f64,
    pub maintenance_cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquipmentSummary {
    pub count: usize,
    pub avg_utilization: f64,
    pub fuel_cost: f64,
    pub maintenance_cost: f64,
}

impl ReportRow for EquipmentRow {
    type Summary = EquipmentSummary;

    const KIND: ReportType = ReportType::EquipmentUtilization;
    const FACETS: &'static [Facet] = &[Facet::Project, Facet::Status, Facet::Type];

    fn facet_value(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Project => Some(self.project.as_str()),
            Facet::Status => Some(self.status.as_str()),
            Facet::Type => Some(self.kind.as_str()),
            _ => None,
        }
    }

    fn summarize(rows: &[&Self]) -> Self::Summary {
        EquipmentSummary {
            count: rows.len(),
            avg_utilization: mean(rows, |row| row.utilization_rate),
            fuel_cost: rows.iter().map(|row| row.fuel_cost).sum(),
            maintenance_cost: rows.iter().map(|row| row.maintenance_cost).sum(),
        }
    }

    fn summary_lines(summary: &Self::Summary, language: Language) -> Vec<(&'static str, String)> {
        let labels = match language {
            Language::Ar => ["عدد المعدات", "متوسط الاستخدام", "تكلفة الوقود", "تكلفة الصيانة"],
            Language::En => ["Equipment", "Avg utilization", "Fuel cost", "Maintenance cost"],
        };
        vec![
            (labels[0], summary.count.to_string()),
            (labels[1], format_percentage(summary.avg_utilization, 1)),
            (labels[2], format_currency(summary.fuel_cost, DEFAULT_CURRENCY)),
            (labels[3], format_currency(summary.maintenance_cost, DEFAULT_CURRENCY)),
        ]
    }

    fn headers(language: Language) -> Vec<&'static str> {
        match language {
            Language::Ar => vec![
                "الكود", "المعدة", "النوع", "ساعات التشغيل", "نسبة الاستخدام", "المشروع",
                "الحالة", "تكلفة الوقود", "تكلفة الصيانة",
            ],
            Language::En => vec![
                "Code", "Equipment", "Type", "Hours", "Utilization", "Project", "Status",
                "Fuel Cost", "Maintenance",
            ],
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.equipment_code.clone(),
            self.equipment_name.clone(),
            self.kind.clone(),
            format!("{} / {}", self.hours_used, self.total_hours),
            format_percentage(self.utilization_rate, 1),
            self.project.clone(),
            self.status.clone(),
            format_currency(self.fuel_cost, DEFAULT_CURRENCY),
            format_currency(self.maintenance_cost, DEFAULT_CURRENCY),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{ReportView, sample};

    #[test]
    fn test_summary_over_bundled_fleet() {
        let view = ReportView::<EquipmentRow>::new(sample::sample_rows().unwrap());
        let summary = view.summary();

        assert_eq!(summary.count, 5);
        // (81.7 + 70.7 + 66.8 + 44.5 + 97.5) / 5
        assert!((summary.avg_utilization - 72.24).abs() < 1e-9);
        assert_eq!(summary.fuel_cost, 59_900.0);
        assert_eq!(summary.maintenance_cost, 16_600.0);
    }

    #[test]
    fn test_status_facet_and_empty_average() {
        let mut view = ReportView::<EquipmentRow>::new(sample::sample_rows().unwrap());
        view.select(Facet::Status, "Maintenance");
        assert_eq!(view.summary().count, 1);

        view.select(Facet::Type, "Crane");
        let summary = view.summary();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.avg_utilization, 0.0);
    }
}
