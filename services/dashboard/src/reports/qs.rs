//! Quantity survey summary report

use serde::{Deserialize, Serialize};

use crate::api::ReportType;
use crate::format::{DEFAULT_CURRENCY, format_currency, format_number};
use crate::models::Language;
use crate::reports::{Facet, ReportRow, count_where, id_string};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QsRow {
    #[serde(deserialize_with = "id_string::deserialize")]
    pub id: String,
    pub qs_number: String,
    pub date: String,
    pub project: String,
    pub description: String,
    /// Contract, Variation or Claim
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: f64,
    pub total_amount: f64,
    pub status: String,
    /// Number of the certificate this survey was billed in
    #[serde(default)]
    pub linked_certificate: Option<String>,
}

impl QsRow {
    pub fn is_linked(&self) -> bool {
        self.linked_certificate.as_deref().is_some_and(|number| !number.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QsSummary {
    pub count: usize,
    pub total_amount: f64,
    pub total_quantity: f64,
    pub approved: usize,
    pub linked: usize,
}

impl ReportRow for QsRow {
    type Summary = QsSummary;

    const KIND: ReportType = ReportType::QsSummary;
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
        QsSummary {
            count: rows.len(),
            total_amount: rows.iter().map(|row| row.total_amount).sum(),
            total_quantity: rows.iter().map(|row| row.quantity).sum(),
            approved: count_where(rows, |row| row.status.as_str(), "Approved"),
            linked: rows.iter().filter(|row| row.is_linked()).count(),
        }
    }

    fn summary_lines(summary: &Self::Summary, language: Language) -> Vec<(&'static str, String)> {
        let labels = match language {
            Language::Ar => ["إجمالي QS", "إجمالي المبالغ", "إجمالي الكميات", "المعتمدة", "مرتبطة بمستخلص"],
            Language::En => ["Surveys", "Total amount", "Total quantity", "Approved", "Linked"],
        };
        vec![
            (labels[0], summary.count.to_string()),
            (labels[1], format_currency(summary.total_amount, DEFAULT_CURRENCY)),
            (labels[2], format_number(summary.total_quantity, 0)),
            (labels[3], summary.approved.to_string()),
            (labels[4], summary.linked.to_string()),
        ]
    }

    fn headers(language: Language) -> Vec<&'static str> {
        match language {
            Language::Ar => vec![
                "رقم QS", "التاريخ", "المشروع", "الوصف", "النوع", "الكمية", "الوحدة", "سعر الوحدة",
                "الإجمالي", "الحالة", "المستخلص المرتبط",
            ],
            Language::En => vec![
                "QS No.", "Date", "Project", "Description", "Type", "Quantity", "Unit", "Unit Price",
                "Total", "Status", "Certificate",
            ],
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.qs_number.clone(),
            self.date.clone(),
            self.project.clone(),
            self.description.clone(),
            self.kind.clone(),
            format_number(self.quantity, 0),
            self.unit.clone(),
            format_currency(self.unit_price, DEFAULT_CURRENCY),
            format_currency(self.total_amount, DEFAULT_CURRENCY),
            self.status.clone(),
            self.linked_certificate
                .clone()
                .filter(|number| !number.is_empty())
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{ReportView, sample};

    #[test]
    fn test_linked_count_ignores_missing_and_empty() {
        let rows: Vec<QsRow> = sample::sample_rows().unwrap();
        let expected = rows
            .iter()
            .filter(|row| matches!(row.linked_certificate.as_deref(), Some(n) if !n.is_empty()))
            .count();

        let view = ReportView::new(rows);
        let summary = view.summary();
        assert_eq!(summary.linked, expected);
        assert!(summary.linked < summary.count);
    }

    #[test]
    fn test_type_facet() {
        let mut view = ReportView::<QsRow>::new(sample::sample_rows().unwrap());
        view.select(Facet::Type, "Variation");

        assert!(!view.filtered().is_empty());
        assert!(view.filtered().iter().all(|row| row.kind == "Variation"));
        assert_eq!(view.options(Facet::Type), vec!["Contract", "Variation", "Claim"]);
    }
}
