//! Plain-text rendering of report pages

use std::fmt::Write;

use crate::models::Language;
use crate::reports::{ReportRow, ReportView};

const COLUMN_GAP: &str = "  ";

fn empty_message(language: Language) -> &'static str {
    match language {
        Language::Ar => "لا توجد بيانات متاحة",
        Language::En => "No data available",
    }
}

/// Title, active facets, summary figures and the filtered table
pub fn render_page<R: ReportRow>(view: &ReportView<R>, language: Language) -> String {
    let mut out = String::new();
    let title = R::KIND.title(language);
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));

    if !view.selection().is_empty() {
        let facets: Vec<String> = view
            .selection()
            .iter()
            .map(|(facet, value)| format!("{}={}", facet, value))
            .collect();
        let _ = writeln!(out, "[{}]", facets.join(", "));
    }

    let filtered = view.filtered();
    for (label, value) in R::summary_lines(&R::summarize(&filtered), language) {
        let _ = writeln!(out, "{}: {}", label, value);
    }
    out.push('\n');

    if filtered.is_empty() {
        let _ = writeln!(out, "{}", empty_message(language));
    } else {
        out.push_str(&render_table(&filtered, language));
    }
    out
}

/// Aligned columns with a header row
pub fn render_table<R: ReportRow>(rows: &[&R], language: Language) -> String {
    let headers = R::headers(language);
    let cells: Vec<Vec<String>> = rows.iter().map(|row| row.cells()).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    write_line(&mut out, headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in &cells {
        write_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn write_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    let _ = writeln!(out, "{}", line.join(COLUMN_GAP).trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{CertificateRow, Facet, sample};

    fn view() -> ReportView<CertificateRow> {
        ReportView::new(sample::sample_rows().unwrap())
    }

    #[test]
    fn test_table_has_header_rule_and_rows() {
        let view = view();
        let table = render_table(&view.filtered(), Language::En);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 2 + 5);
        assert!(lines[0].starts_with("Certificate"));
        assert!(lines[1].starts_with("---"));
    }

    #[test]
    fn test_page_shows_selection_and_summary() {
        let mut view = view();
        view.select(Facet::Status, "Approved");

        let page = render_page(&view, Language::En);
        assert!(page.starts_with("Certificates Report\n"));
        assert!(page.contains("[status=Approved]"));
        assert!(page.contains("Certificates: 3"));
    }

    #[test]
    fn test_empty_page_message() {
        let mut view = view();
        view.select(Facet::Project, "missing");

        assert!(render_page(&view, Language::Ar).contains("لا توجد بيانات متاحة"));
    }
}
