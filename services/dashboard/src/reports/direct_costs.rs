//! Direct costs report: labor, material and equipment spend

use serde::{Deserialize, Serialize};

use crate::api::ReportType;
use crate::format::{DEFAULT_CURRENCY, format_currency, format_number};
use crate::models::Language;
use crate::reports::{Facet, ReportRow, count_where, id_string};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectCostRow {
    #[serde(deserialize_with = "id_string::deserialize")]
    pub id: String,
    pub date: String,
    pub project: String,
    /// Labor, Material, Equipment or another spend category
    pub category: String,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub supplier: String,
    pub payment_status: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectCostsSummary {
    pub total: f64,
    pub labor: f64,
    pub material: f64,
    pub equipment: f64,
    pub paid_count: usize,
}

fn category_total(rows: &[&DirectCostRow], category: &str) -> f64 {
    rows.iter()
        .filter(|row| row.category == category)
        .map(|row| row.total_cost)
        .sum()
}

impl ReportRow for DirectCostRow {
    type Summary = DirectCostsSummary;

    const KIND: ReportType = ReportType::DirectCosts;
    const FACETS: &'static [Facet] = &[Facet::Project, Facet::Category, Facet::PaymentStatus];

    fn facet_value(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Project => Some(self.project.as_str()),
            Facet::Category => Some(self.category.as_str()),
            Facet::PaymentStatus => Some(self.payment_status.as_str()),
            _ => None,
        }
    }

    fn summarize(rows: &[&Self]) -> Self::Summary {
        DirectCostsSummary {
            total: rows.iter().map(|row| row.total_cost).sum(),
            labor: category_total(rows, "Labor"),
            material: category_total(rows, "Material"),
            equipment: category_total(rows, "Equipment"),
            paid_count: count_where(rows, |row| row.payment_status.as_str(), "Paid"),
        }
    }

    fn summary_lines(summary: &Self::Summary, language: Language) -> Vec<(&'static str, String)> {
        let labels = match language {
            Language::Ar => ["إجمالي التكاليف", "العمالة", "المواد", "المعدات", "المدفوعة"],
            Language::En => ["Total costs", "Labor", "Material", "Equipment", "Paid"],
        };
        vec![
            (labels[0], format_currency(summary.total, DEFAULT_CURRENCY)),
            (labels[1], format_currency(summary.labor, DEFAULT_CURRENCY)),
            (labels[2], format_currency(summary.material, DEFAULT_CURRENCY)),
            (labels[3], format_currency(summary.equipment, DEFAULT_CURRENCY)),
            (labels[4], summary.paid_count.to_string()),
        ]
    }

    fn headers(language: Language) -> Vec<&'static str> {
        match language {
            Language::Ar => vec![
                "التاريخ", "المشروع", "الفئة", "الوصف", "الكمية", "الوحدة", "سعر الوحدة",
                "الإجمالي", "المورد", "حالة الدفع",
            ],
            Language::En => vec![
                "Date", "Project", "Category", "Description", "Quantity", "Unit", "Unit Cost",
                "Total", "Supplier", "Payment",
            ],
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            self.project.clone(),
            self.category.clone(),
            self.description.clone(),
            format_number(self.quantity, 0),
            self.unit.clone(),
            format_currency(self.unit_cost, DEFAULT_CURRENCY),
            format_currency(self.total_cost, DEFAULT_CURRENCY),
            self.supplier.clone(),
            self.payment_status.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{ReportView, sample};

    fn view() -> ReportView<DirectCostRow> {
        ReportView::new(sample::sample_rows().unwrap())
    }

    #[test]
    fn test_category_totals_add_up() {
        let summary = view().summary();
        // The bundled dataset only uses the three named categories
        let parts = summary.labor + summary.material + summary.equipment;
        assert!((summary.total - parts).abs() < 1e-6);
        assert!(summary.labor > 0.0 && summary.material > 0.0 && summary.equipment > 0.0);
    }

    #[test]
    fn test_category_facet_zeroes_other_categories() {
        let mut view = view();
        view.select(Facet::Category, "Material");

        let summary = view.summary();
        assert_eq!(summary.labor, 0.0);
        assert_eq!(summary.equipment, 0.0);
        assert_eq!(summary.total, summary.material);
    }
}
