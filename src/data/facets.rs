use std::collections::HashSet;

use super::model::{utf16_cmp, PriceRecord};

// ---------------------------------------------------------------------------
// Facets: distinct selectable values for the filter drop-downs
// ---------------------------------------------------------------------------

/// Every distinct continent in the full record set, sorted ordinally.
pub fn continents(records: &[PriceRecord]) -> Vec<String> {
    distinct_sorted(records.iter().map(|r| r.continent.as_str()))
}

/// Distinct countries, restricted to `continent` when one is selected.
pub fn countries(records: &[PriceRecord], continent: Option<&str>) -> Vec<String> {
    let continent = continent.filter(|c| !c.is_empty());
    let countries = records
        .iter()
        .filter(|r| continent.map_or(true, |c| r.continent == c))
        .map(|r| r.country.as_str());
    distinct_sorted(countries)
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = values
        .collect::<HashSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    out.sort_by(|a, b| utf16_cmp(a, b));
    out
}
