use anyhow::{Context, Result};

use crate::data::filter::{SortConfig, SortKey};
use crate::data::model::PriceRecord;
use crate::data::query::QueryView;

// ---------------------------------------------------------------------------
// Headless output of a QueryView
// ---------------------------------------------------------------------------

fn cell(record: &PriceRecord, key: SortKey) -> &str {
    match key {
        SortKey::City => &record.city,
        SortKey::Country => &record.country,
        SortKey::Continent => &record.continent,
        SortKey::PriceCzk => &record.price_czk,
    }
}

/// Aligned plain-text table: header with the sort arrow, one line per
/// visible record, then the results count.
pub fn render_text(records: &[PriceRecord], view: &QueryView, sort: &SortConfig) -> String {
    let headers: Vec<String> = SortKey::ALL.iter().map(|&k| sort.header_label(k)).collect();
    let rows: Vec<[&str; 4]> = view
        .visible
        .iter()
        .map(|&i| SortKey::ALL.map(|k| cell(&records[i], k)))
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, text) in widths.iter_mut().zip(row) {
            *w = (*w).max(text.chars().count());
        }
    }

    let mut out = pad_line(headers.iter().map(String::as_str), &widths);
    let rule_width = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    out.push_str(&"-".repeat(rule_width));
    out.push('\n');
    for row in &rows {
        out.push_str(&pad_line(row.iter().copied(), &widths));
    }
    out.push_str(&format!("Showing {} of {} results\n", view.visible.len(), view.total));
    out
}

fn pad_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(text, &width)| format!("{text:<width$}"))
        .collect();
    let mut out = padded.join("  ").trim_end().to_string();
    out.push('\n');
    out
}

/// Visible records as a pretty-printed JSON array (API field names).
pub fn render_json(records: &[PriceRecord], view: &QueryView) -> Result<String> {
    let visible: Vec<&PriceRecord> = view.visible.iter().map(|&i| &records[i]).collect();
    serde_json::to_string_pretty(&visible).context("serializing visible records")
}
