//! Payment certificates report

use serde::{Deserialize, Serialize};

use crate::api::ReportType;
use crate::format::{DEFAULT_CURRENCY, format_currency};
use crate::models::Language;
use crate::reports::{Facet, ReportRow, count_where, id_string};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRow {
    #[serde(deserialize_with = "id_string::deserialize")]
    pub id: String,
    pub certificate_number: String,
    pub qs_number: String,
    pub project: String,
    pub description: String,
    pub date: String,
    pub amount: f64,
    pub paid_amount: f64,
    /// Approved, Pending or Rejected
    pub status: String,
    /// Paid, Partial or Unpaid
    pub payment_status: String,
    #[serde(default)]
    pub approved_by: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CertificatesSummary {
    pub count: usize,
    pub total_amount: f64,
    pub total_paid: f64,
    pub approved: usize,
    pub pending: usize,
}

impl ReportRow for CertificateRow {
    type Summary = CertificatesSummary;

    const KIND: ReportType = ReportType::Certificates;
    const FACETS: &'static [Facet] = &[Facet::Project, Facet::Status, Facet::PaymentStatus];

    fn facet_value(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Project => Some(self.project.as_str()),
            Facet::Status => Some(self.status.as_str()),
            Facet::PaymentStatus => Some(self.payment_status.as_str()),
            _ => None,
        }
    }

    fn summarize(rows: &[&Self]) -> Self::Summary {
        CertificatesSummary {
            count: rows.len(),
            total_amount: rows.iter().map(|row| row.amount).sum(),
            total_paid: rows.iter().map(|row| row.paid_amount).sum(),
            approved: count_where(rows, |row| row.status.as_str(), "Approved"),
            pending: count_where(rows, |row| row.status.as_str(), "Pending"),
        }
    }

    fn summary_lines(summary: &Self::Summary, language: Language) -> Vec<(&'static str, String)> {
        let labels = match language {
            Language::Ar => ["إجمالي المستخلصات", "إجمالي المبالغ", "المبالغ المدفوعة", "المعتمدة", "قيد المراجعة"],
            Language::En => ["Certificates", "Total amount", "Total paid", "Approved", "Pending"],
        };
        vec![
            (labels[0], summary.count.to_string()),
            (labels[1], format_currency(summary.total_amount, DEFAULT_CURRENCY)),
            (labels[2], format_currency(summary.total_paid, DEFAULT_CURRENCY)),
            (labels[3], summary.approved.to_string()),
            (labels[4], summary.pending.to_string()),
        ]
    }

    fn headers(language: Language) -> Vec<&'static str> {
        match language {
            Language::Ar => vec![
                "رقم المستخلص", "رقم QS", "المشروع", "الوصف", "التاريخ", "المبلغ", "المدفوع",
                "الحالة", "حالة الدفع", "اعتمد بواسطة",
            ],
            Language::En => vec![
                "Certificate No.", "QS No.", "Project", "Description", "Date", "Amount", "Paid",
                "Status", "Payment", "Approved By",
            ],
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.certificate_number.clone(),
            self.qs_number.clone(),
            self.project.clone(),
            self.description.clone(),
            self.date.clone(),
            format_currency(self.amount, DEFAULT_CURRENCY),
            format_currency(self.paid_amount, DEFAULT_CURRENCY),
            self.status.clone(),
            self.payment_status.clone(),
            self.approved_by.clone().unwrap_or_else(|| "-".to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{ReportView, sample};

    #[test]
    fn test_summary_over_full_dataset() {
        let view = ReportView::<CertificateRow>::new(sample::sample_rows().unwrap());
        let summary = view.summary();

        assert_eq!(summary.count, 5);
        assert_eq!(summary.approved, 3);
        assert_eq!(summary.pending, 1);
        let expected_amount: f64 = view.rows().iter().map(|row| row.amount).sum();
        assert_eq!(summary.total_amount, expected_amount);
        assert!(summary.total_paid <= summary.total_amount);
    }

    #[test]
    fn test_payment_status_facet() {
        let mut view = ReportView::<CertificateRow>::new(sample::sample_rows().unwrap());
        view.select(Facet::PaymentStatus, "Unpaid");

        let summary = view.summary();
        assert!(summary.count > 0);
        assert!(view.filtered().iter().all(|row| row.payment_status == "Unpaid"));
        assert_eq!(
            summary.total_paid,
            view.filtered().iter().map(|row| row.paid_amount).sum::<f64>()
        );
    }
}
