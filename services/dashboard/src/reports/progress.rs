//! Project progress report: planned against executed value

use serde::{Deserialize, Serialize};

use crate::api::ReportType;
use crate::format::{DEFAULT_CURRENCY, format_currency, format_percentage};
use crate::models::Language;
use crate::reports::{Facet, ReportRow, mean};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRow {
    pub project_name: String,
    pub planned_value: f64,
    pub executed_value: f64,
    pub completion_percentage: f64,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSummary {
    pub count: usize,
    pub planned: f64,
    pub executed: f64,
    pub avg_completion: f64,
}

impl ReportRow for ProgressRow {
    type Summary = ProgressSummary;

    const KIND: ReportType = ReportType::ProjectProgress;
    const FACETS: &'static [Facet] = &[Facet::Project, Facet::Status];

    fn facet_value(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Project => Some(self.project_name.as_str()),
            Facet::Status => Some(self.status.as_str()),
            _ => None,
        }
    }

    fn summarize(rows: &[&Self]) -> Self::Summary {
        ProgressSummary {
            count: rows.len(),
            planned: rows.iter().map(|row| row.planned_value).sum(),
            executed: rows.iter().map(|row| row.executed_value).sum(),
            avg_completion: mean(rows, |row| row.completion_percentage),
        }
    }

    fn summary_lines(summary: &Self::Summary, language: Language) -> Vec<(&'static str, String)> {
        let labels = match language {
            Language::Ar => ["عدد المشاريع", "القيمة المخططة", "القيمة المنفذة", "متوسط الإنجاز"],
            Language::En => ["Projects", "Planned value", "Executed value", "Avg completion"],
        };
        vec![
            (labels[0], summary.count.to_string()),
            (labels[1], format_currency(summary.planned, DEFAULT_CURRENCY)),
            (labels[2], format_currency(summary.executed, DEFAULT_CURRENCY)),
            (labels[3], format_percentage(summary.avg_completion, 1)),
        ]
    }

    fn headers(language: Language) -> Vec<&'static str> {
        match language {
            Language::Ar => vec!["المشروع", "القيمة المخططة", "القيمة المنفذة", "نسبة الإنجاز", "الحالة"],
            Language::En => vec!["Project", "Planned", "Executed", "Completion", "Status"],
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.project_name.clone(),
            format_currency(self.planned_value, DEFAULT_CURRENCY),
            format_currency(self.executed_value, DEFAULT_CURRENCY),
            format!("{}%", self.completion_percentage),
            self.status.clone(),
        ]
    }
}
