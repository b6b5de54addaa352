//! Report views: per-report rows, facet filtering and summaries
//!
//! Each report page holds a full dataset and a set of facet selections.
//! Filtering is conjunctive over the selected facets and every summary is
//! computed from the filtered rows only.

pub mod certificates;
pub mod direct_costs;
pub mod equipment;
pub mod fuel;
pub mod profitability;
pub mod progress;
pub mod qs;
pub mod sample;
pub mod table;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::ReportType;
use crate::error::{ApiError, ApiResult};
use crate::models::{Language, ReportData, ReportFilter};

pub use certificates::{CertificateRow, CertificatesSummary};
pub use direct_costs::{DirectCostRow, DirectCostsSummary};
pub use equipment::{EquipmentRow, EquipmentSummary};
pub use fuel::{FuelRow, FuelSummary};
pub use profitability::{ProfitabilityRow, ProfitabilitySummary};
pub use progress::{ProgressRow, ProgressSummary};
pub use qs::{QsRow, QsSummary};

/// Selection value meaning "no restriction on this facet"
pub const ALL: &str = "all";

/// A categorical column a report can be filtered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Facet {
    Project,
    Status,
    PaymentStatus,
    Category,
    Type,
    Equipment,
}

impl Facet {
    pub fn key(self) -> &'static str {
        match self {
            Facet::Project => "project",
            Facet::Status => "status",
            Facet::PaymentStatus => "paymentStatus",
            Facet::Category => "category",
            Facet::Type => "type",
            Facet::Equipment => "equipment",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Facet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" => Ok(Facet::Project),
            "status" => Ok(Facet::Status),
            "paymentStatus" | "payment-status" => Ok(Facet::PaymentStatus),
            "category" => Ok(Facet::Category),
            "type" => Ok(Facet::Type),
            "equipment" => Ok(Facet::Equipment),
            other => Err(format!("unknown facet: {}", other)),
        }
    }
}

/// Selected value per facet; an absent facet is unrestricted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetSelection {
    selected: BTreeMap<Facet, String>,
}

impl FacetSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map the categorical fields of a report filter onto facets
    pub fn from_filter(filter: &ReportFilter) -> Self {
        let mut selection = Self::new();
        for (facet, value) in [
            (Facet::Project, &filter.project_id),
            (Facet::Status, &filter.status),
            (Facet::Type, &filter.kind),
        ] {
            if let Some(value) = value {
                selection.select(facet, value.clone());
            }
        }
        selection
    }

    /// Restrict `facet` to `value`; [`ALL`] clears the restriction
    pub fn select(&mut self, facet: Facet, value: impl Into<String>) {
        let value = value.into();
        if value == ALL {
            self.selected.remove(&facet);
        } else {
            self.selected.insert(facet, value);
        }
    }

    pub fn get(&self, facet: Facet) -> Option<&str> {
        self.selected.get(&facet).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Facet, &str)> {
        self.selected.iter().map(|(facet, value)| (*facet, value.as_str()))
    }

    /// True when `row` equals every selected value
    pub fn matches<R: ReportRow>(&self, row: &R) -> bool {
        self.selected
            .iter()
            .all(|(facet, value)| row.facet_value(*facet) == Some(value.as_str()))
    }
}

/// A row of one report page
pub trait ReportRow: DeserializeOwned + Clone + Send + Sync + 'static {
    type Summary: fmt::Debug + Clone + PartialEq;

    const KIND: ReportType;
    /// Facets this report can be filtered by
    const FACETS: &'static [Facet];

    fn facet_value(&self, facet: Facet) -> Option<&str>;

    fn summarize(rows: &[&Self]) -> Self::Summary;

    /// Labelled, formatted summary figures
    fn summary_lines(summary: &Self::Summary, language: Language) -> Vec<(&'static str, String)>;

    fn headers(language: Language) -> Vec<&'static str>;

    fn cells(&self) -> Vec<String>;
}

/// A report page: full dataset plus the current facet selection
#[derive(Debug, Clone)]
pub struct ReportView<R> {
    rows: Vec<R>,
    selection: FacetSelection,
}

impl<R: ReportRow> ReportView<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self {
            rows,
            selection: FacetSelection::new(),
        }
    }

    /// View with an initial selection; facets the report lacks are dropped
    pub fn with_selection(rows: Vec<R>, selection: &FacetSelection) -> Self {
        let mut view = Self::new(rows);
        for (facet, value) in selection.iter() {
            view.select(facet, value);
        }
        view
    }

    /// Rows of a fetched report payload
    pub fn from_report(report: &ReportData) -> ApiResult<Self> {
        Ok(Self::new(decode_rows(report)?))
    }

    /// Restrict `facet` to `value`, or clear it with [`ALL`].
    ///
    /// Facets this report does not offer are ignored.
    pub fn select(&mut self, facet: Facet, value: impl Into<String>) {
        if !R::FACETS.contains(&facet) {
            debug!("{} report has no {} facet, ignoring", R::KIND, facet);
            return;
        }
        self.selection.select(facet, value);
    }

    /// Clear every facet
    pub fn reset(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> &FacetSelection {
        &self.selection
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Rows matching every selected facet, in dataset order
    pub fn filtered(&self) -> Vec<&R> {
        self.rows
            .iter()
            .filter(|row| self.selection.matches(*row))
            .collect()
    }

    pub fn summary(&self) -> R::Summary {
        R::summarize(&self.filtered())
    }

    /// Distinct values of `facet` across the full dataset, first-seen order
    pub fn options(&self, facet: Facet) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter_map(|row| row.facet_value(facet))
            .filter(|value| seen.insert(*value))
            .map(str::to_string)
            .collect()
    }
}

/// Decode the `data` array of a report payload into rows
pub fn decode_rows<R: ReportRow>(report: &ReportData) -> ApiResult<Vec<R>> {
    Ok(Vec::<R>::deserialize(&report.data)?)
}

/// Render one report as a plain-text page: title, summary and table.
///
/// Without a fetched payload the bundled sample dataset is used.
pub fn render_report(
    kind: ReportType,
    report: Option<&ReportData>,
    selection: &FacetSelection,
    language: Language,
) -> ApiResult<String> {
    match kind {
        ReportType::ProjectProgress => render::<ProgressRow>(report, selection, language),
        ReportType::EquipmentUtilization => render::<EquipmentRow>(report, selection, language),
        ReportType::FuelConsumption => render::<FuelRow>(report, selection, language),
        ReportType::Certificates => render::<CertificateRow>(report, selection, language),
        ReportType::QsSummary => render::<QsRow>(report, selection, language),
        ReportType::DirectCosts => render::<DirectCostRow>(report, selection, language),
        ReportType::Profitability => render::<ProfitabilityRow>(report, selection, language),
    }
}

fn render<R: ReportRow>(
    report: Option<&ReportData>,
    selection: &FacetSelection,
    language: Language,
) -> ApiResult<String> {
    let rows = match report {
        Some(report) => decode_rows::<R>(report)?,
        None => sample::sample_rows::<R>()
            .map_err(|e| ApiError::Decode(format!("bundled {} dataset: {}", R::KIND, e)))?,
    };
    let view = ReportView::with_selection(rows, selection);
    Ok(table::render_page(&view, language))
}

/// Count of rows whose `field` equals `value`
pub(crate) fn count_where<R>(rows: &[&R], field: impl Fn(&R) -> &str, value: &str) -> usize {
    rows.iter().filter(|&&row| field(row) == value).count()
}

/// Mean of `field`, or 0 when there are no rows
pub(crate) fn mean<R>(rows: &[&R], field: impl Fn(&R) -> f64) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|&row| field(row)).sum::<f64>() / rows.len() as f64
}

/// Backend ids arrive as numbers or strings
pub(crate) mod id_string {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }
}
