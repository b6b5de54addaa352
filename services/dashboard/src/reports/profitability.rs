//! Project profitability report

use serde::{Deserialize, Serialize};

use crate::api::ReportType;
use crate::format::{
    DEFAULT_CURRENCY, format_compact_currency, format_currency, format_percentage,
};
use crate::models::Language;
use crate::reports::{Facet, ReportRow, id_string, mean};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitabilityRow {
    #[serde(deserialize_with = "id_string::deserialize")]
    pub id: String,
    pub project: String,
    pub contract_value: f64,
    pub total_revenue: f64,
    pub total_costs: f64,
    pub direct_costs: f64,
    pub indirect_costs: f64,
    pub gross_profit: f64,
    /// Percent of revenue
    pub gross_margin: f64,
    pub net_profit: f64,
    pub net_margin: f64,
    pub status: String,
    /// Completion percentage
    pub completion: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfitabilitySummary {
    pub revenue: f64,
    pub costs: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
    pub avg_gross_margin: f64,
}

impl ReportRow for ProfitabilityRow {
    type Summary = ProfitabilitySummary;

    const KIND: ReportType = ReportType::Profitability;
    const FACETS: &'static [Facet] = &[Facet::Project, Facet::Status];

    fn facet_value(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Project => Some(self.project.as_str()),
            Facet::Status => Some(self.status.as_str()),
            _ => None,
        }
    }

    fn summarize(rows: &[&Self]) -> Self::Summary {
        ProfitabilitySummary {
            revenue: rows.iter().map(|row| row.total_revenue).sum(),
            costs: rows.iter().map(|row| row.total_costs).sum(),
            gross_profit: rows.iter().map(|row| row.gross_profit).sum(),
            net_profit: rows.iter().map(|row| row.net_profit).sum(),
            avg_gross_margin: mean(rows, |row| row.gross_margin),
        }
    }

    fn summary_lines(summary: &Self::Summary, language: Language) -> Vec<(&'static str, String)> {
        let labels = match language {
            Language::Ar => ["إجمالي الإيرادات", "إجمالي التكاليف", "إجمالي الربح", "صافي الربح", "متوسط هامش الربح"],
            Language::En => ["Revenue", "Costs", "Gross profit", "Net profit", "Avg gross margin"],
        };
        vec![
            (labels[0], format_compact_currency(summary.revenue)),
            (labels[1], format_compact_currency(summary.costs)),
            (labels[2], format_compact_currency(summary.gross_profit)),
            (labels[3], format_compact_currency(summary.net_profit)),
            (labels[4], format_percentage(summary.avg_gross_margin, 1)),
        ]
    }

    fn headers(language: Language) -> Vec<&'static str> {
        match language {
            Language::Ar => vec![
                "المشروع", "قيمة العقد", "الإيرادات", "التكاليف", "مباشرة", "غير مباشرة",
                "إجمالي الربح", "هامش إجمالي", "صافي الربح", "هامش صافي", "الحالة", "نسبة الإنجاز",
            ],
            Language::En => vec![
                "Project", "Contract", "Revenue", "Costs", "Direct", "Indirect", "Gross Profit",
                "Gross %", "Net Profit", "Net %", "Status", "Completion",
            ],
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.project.clone(),
            format_currency(self.contract_value, DEFAULT_CURRENCY),
            format_currency(self.total_revenue, DEFAULT_CURRENCY),
            format_currency(self.total_costs, DEFAULT_CURRENCY),
            format_currency(self.direct_costs, DEFAULT_CURRENCY),
            format_currency(self.indirect_costs, DEFAULT_CURRENCY),
            format_currency(self.gross_profit, DEFAULT_CURRENCY),
            format!("{:.1}%", self.gross_margin),
            format_currency(self.net_profit, DEFAULT_CURRENCY),
            format!("{:.1}%", self.net_margin),
            self.status.clone(),
            format!("{}%", self.completion),
        ]
    }
}
