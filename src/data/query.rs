use std::cmp::Ordering;
use std::collections::HashMap;

use super::facets;
use super::filter::{FilterState, SortDirection, SortKey};
use super::model::{utf16_cmp, PriceRecord};

// ---------------------------------------------------------------------------
// QueryView – everything the rendering surface needs for one frame
// ---------------------------------------------------------------------------

/// Result of running the pipeline over the full record set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryView {
    /// Continent drop-down options (never filtered).
    pub continents: Vec<String>,
    /// Country drop-down options for the selected continent.
    pub countries: Vec<String>,
    /// Indices into the record slice, in display order.
    pub visible: Vec<usize>,
    /// Size of the unfiltered record set.
    pub total: usize,
}

/// Derive facets and the visible rows from `records` and the current
/// selections. Pure; callers recompute whenever either input changes.
pub fn run_query(records: &[PriceRecord], filters: &FilterState) -> QueryView {
    QueryView {
        continents: facets::continents(records),
        countries: facets::countries(records, filters.active_continent()),
        visible: visible_indices(records, filters),
        total: records.len(),
    }
}

/// Filter, deduplicate and sort, returning indices into `records`.
///
/// Stages run in a fixed order:
/// 1. continent and country exact match
/// 2. case-insensitive substring search over city, country and continent
/// 3. one row per city, keeping the cheapest (first wins on ties)
/// 4. stable sort on the active key
pub fn visible_indices(records: &[PriceRecord], filters: &FilterState) -> Vec<usize> {
    let continent = filters.active_continent();
    let country = filters.active_country();
    let needle = filters.search_term.to_lowercase();

    let mut indices: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| continent.map_or(true, |c| r.continent == c))
        .filter(|(_, r)| country.map_or(true, |c| r.country == c))
        .filter(|(_, r)| needle.is_empty() || matches_search(r, &needle))
        .map(|(i, _)| i)
        .collect();

    if filters.remove_duplicates {
        indices = cheapest_per_city(records, &indices);
    }

    sort_indices(records, &mut indices, filters.sort.key, filters.sort.direction);
    indices
}

/// `needle` must already be lower-cased.
fn matches_search(record: &PriceRecord, needle: &str) -> bool {
    [&record.city, &record.country, &record.continent]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Collapse rows sharing a city into the cheapest one. Output keeps the
/// position at which each city was first seen.
fn cheapest_per_city(records: &[PriceRecord], indices: &[usize]) -> Vec<usize> {
    let mut slot_of_city: HashMap<&str, usize> = HashMap::new();
    let mut kept: Vec<usize> = Vec::new();

    for &idx in indices {
        let rec = &records[idx];
        match slot_of_city.get(rec.city.as_str()) {
            None => {
                slot_of_city.insert(rec.city.as_str(), kept.len());
                kept.push(idx);
            }
            Some(&slot) => {
                // NaN on either side never replaces.
                if rec.price_value() < records[kept[slot]].price_value() {
                    kept[slot] = idx;
                }
            }
        }
    }
    kept
}

fn sort_indices(
    records: &[PriceRecord],
    indices: &mut [usize],
    key: SortKey,
    direction: SortDirection,
) {
    // `sort_by` is stable, and reversing the comparator (not the output)
    // keeps equal rows in their prior order for both directions.
    indices.sort_by(|&a, &b| {
        let ord = compare_by(&records[a], &records[b], key);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

fn compare_by(a: &PriceRecord, b: &PriceRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::City => utf16_cmp(&a.city, &b.city),
        SortKey::Country => utf16_cmp(&a.country, &b.country),
        SortKey::Continent => utf16_cmp(&a.continent, &b.continent),
        SortKey::PriceCzk => compare_prices(a.price_value(), b.price_value()),
    }
}

/// Total order over parsed prices: unparseable (NaN) prices are equal to
/// each other and greater than every number.
fn compare_prices(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::data::filter::SortConfig;
    use crate::data::model::tests::record;

    fn czech() -> Vec<PriceRecord> {
        vec![
            record(1, "Prague", "Czechia", "Europe", "100.00"),
            record(2, "Prague", "Czechia", "Europe", "80.00"),
            record(3, "Brno", "Czechia", "Europe", "90.00"),
        ]
    }

    fn ids(records: &[PriceRecord], indices: &[usize]) -> Vec<i64> {
        indices.iter().map(|&i| records[i].id).collect()
    }

    fn sorted(key: SortKey, direction: SortDirection) -> FilterState {
        FilterState {
            remove_duplicates: false,
            sort: SortConfig { key, direction },
            ..FilterState::default()
        }
    }

    #[test]
    fn default_state_keeps_cheapest_per_city() {
        let records = czech();
        let visible = visible_indices(&records, &FilterState::default());
        assert_eq!(ids(&records, &visible), vec![2, 3]);
    }

    #[test]
    fn without_dedup_all_rows_sorted_by_price() {
        let records = czech();
        let filters = FilterState {
            remove_duplicates: false,
            ..FilterState::default()
        };
        assert_eq!(ids(&records, &visible_indices(&records, &filters)), vec![2, 3, 1]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let records = czech();
        for term in ["brno", "BRNO", "bRn"] {
            let filters = FilterState {
                search_term: term.to_string(),
                ..FilterState::default()
            };
            assert_eq!(ids(&records, &visible_indices(&records, &filters)), vec![3]);
        }
    }

    #[test]
    fn search_matches_country_and_continent_too() {
        let records = vec![
            record(1, "Prague", "Czechia", "Europe", "100.00"),
            record(2, "Tokyo", "Japan", "Asia", "300.00"),
            record(3, "Lima", "Peru", "South America", "70.00"),
        ];
        let by_country = FilterState {
            search_term: "jap".into(),
            ..FilterState::default()
        };
        assert_eq!(ids(&records, &visible_indices(&records, &by_country)), vec![2]);
        let by_continent = FilterState {
            search_term: "america".into(),
            ..FilterState::default()
        };
        assert_eq!(ids(&records, &visible_indices(&records, &by_continent)), vec![3]);
    }

    #[test]
    fn continent_and_country_filters_are_exact() {
        let records = vec![
            record(1, "Prague", "Czechia", "Europe", "100.00"),
            record(2, "Vienna", "Austria", "Europe", "120.00"),
            record(3, "Tokyo", "Japan", "Asia", "300.00"),
        ];
        let europe = FilterState {
            continent: Some("Europe".into()),
            ..FilterState::default()
        };
        assert_eq!(ids(&records, &visible_indices(&records, &europe)), vec![1, 2]);
        let austria = FilterState {
            continent: Some("Europe".into()),
            country: Some("Austria".into()),
            ..FilterState::default()
        };
        assert_eq!(ids(&records, &visible_indices(&records, &austria)), vec![2]);
        let partial = FilterState {
            continent: Some("Eur".into()),
            ..FilterState::default()
        };
        assert!(visible_indices(&records, &partial).is_empty());
    }

    #[test]
    fn country_filter_applies_without_continent() {
        let records = vec![
            record(1, "Prague", "Czechia", "Europe", "100.00"),
            record(2, "Vienna", "Austria", "Europe", "120.00"),
        ];
        let filters = FilterState {
            country: Some("Czechia".into()),
            ..FilterState::default()
        };
        assert_eq!(ids(&records, &visible_indices(&records, &filters)), vec![1]);
    }

    #[test]
    fn dedup_tie_keeps_first_seen() {
        let records = vec![
            record(1, "Prague", "Czechia", "Europe", "80.00"),
            record(2, "Prague", "Czechia", "Europe", "80.0"),
            record(3, "Prague", "Czechia", "Europe", "95.00"),
        ];
        let filters = FilterState::default();
        assert_eq!(ids(&records, &visible_indices(&records, &filters)), vec![1]);
    }

    #[test]
    fn dedup_keeps_first_encounter_order_of_cities() {
        let records = vec![
            record(1, "Prague", "Czechia", "Europe", "100.00"),
            record(2, "Brno", "Czechia", "Europe", "100.00"),
            record(3, "Prague", "Czechia", "Europe", "100.00"),
            record(4, "Ostrava", "Czechia", "Europe", "100.00"),
        ];
        // Equal prices: the stable sort leaves dedup order untouched.
        let visible = visible_indices(&records, &FilterState::default());
        assert_eq!(ids(&records, &visible), vec![1, 2, 4]);
    }

    #[test]
    fn dedup_runs_after_filters() {
        let records = vec![
            record(1, "Springfield", "USA", "North America", "50.00"),
            record(2, "Springfield", "Australia", "Oceania", "40.00"),
        ];
        let filters = FilterState {
            continent: Some("North America".into()),
            ..FilterState::default()
        };
        assert_eq!(ids(&records, &visible_indices(&records, &filters)), vec![1]);
    }

    #[test]
    fn string_keys_sort_in_both_directions() {
        let records = vec![
            record(1, "Vienna", "Austria", "Europe", "1"),
            record(2, "Brno", "Czechia", "Europe", "1"),
            record(3, "Tokyo", "Japan", "Asia", "1"),
        ];
        let asc = visible_indices(&records, &sorted(SortKey::City, SortDirection::Ascending));
        assert_eq!(ids(&records, &asc), vec![2, 3, 1]);
        let desc = visible_indices(&records, &sorted(SortKey::Country, SortDirection::Descending));
        assert_eq!(ids(&records, &desc), vec![3, 2, 1]);
        let cont = visible_indices(&records, &sorted(SortKey::Continent, SortDirection::Ascending));
        assert_eq!(ids(&records, &cont), vec![3, 1, 2]);
    }

    #[test]
    fn city_sort_uses_utf16_order() {
        let records = vec![
            record(1, "\u{FF2F}saka", "Japan", "Asia", "1"),
            record(2, "\u{1F3D9} Town", "Nowhere", "Asia", "1"),
            record(3, "Osaka", "Japan", "Asia", "1"),
        ];
        let asc = visible_indices(&records, &sorted(SortKey::City, SortDirection::Ascending));
        assert_eq!(ids(&records, &asc), vec![3, 2, 1]);
    }

    #[test]
    fn leading_number_prices_drive_dedup_and_sort() {
        let records = vec![
            record(1, "Prague", "Czechia", "Europe", "13.00"),
            record(2, "Prague", "Czechia", "Europe", "12.50 CZK"),
            record(3, "Brno", "Czechia", "Europe", "20.00"),
        ];
        let deduped = visible_indices(&records, &FilterState::default());
        assert_eq!(ids(&records, &deduped), vec![2, 3]);
        let all = visible_indices(&records, &sorted(SortKey::PriceCzk, SortDirection::Ascending));
        assert_eq!(ids(&records, &all), vec![2, 1, 3]);
    }

    #[test]
    fn lowercase_inf_sorts_like_unparseable() {
        let records = vec![
            record(1, "A", "X", "Europe", "inf"),
            record(2, "B", "X", "Europe", "Infinity"),
            record(3, "C", "X", "Europe", "5"),
        ];
        let asc = visible_indices(&records, &sorted(SortKey::PriceCzk, SortDirection::Ascending));
        assert_eq!(ids(&records, &asc), vec![3, 2, 1]);
    }

    #[test]
    fn price_sorts_numerically_not_lexically() {
        let records = vec![
            record(1, "A", "X", "Europe", "100.00"),
            record(2, "B", "X", "Europe", "9.50"),
            record(3, "C", "X", "Europe", "25.00"),
        ];
        let asc = visible_indices(&records, &sorted(SortKey::PriceCzk, SortDirection::Ascending));
        assert_eq!(ids(&records, &asc), vec![2, 3, 1]);
    }

    #[test]
    fn descending_keeps_ties_in_prior_order() {
        let records = vec![
            record(1, "A", "X", "Europe", "50.00"),
            record(2, "B", "X", "Europe", "10.00"),
            record(3, "C", "X", "Europe", "50.00"),
            record(4, "D", "X", "Europe", "10.00"),
        ];
        let asc = visible_indices(&records, &sorted(SortKey::PriceCzk, SortDirection::Ascending));
        assert_eq!(ids(&records, &asc), vec![2, 4, 1, 3]);
        let desc = visible_indices(&records, &sorted(SortKey::PriceCzk, SortDirection::Descending));
        // Not a plain reversal: ties stay 1 before 3 and 2 before 4.
        assert_eq!(ids(&records, &desc), vec![1, 3, 2, 4]);
    }

    #[test]
    fn malformed_prices_do_not_panic() {
        let records = vec![
            record(1, "A", "X", "Europe", "abc"),
            record(2, "B", "X", "Europe", "10.00"),
            record(3, "C", "X", "Europe", ""),
            record(4, "D", "X", "Europe", "5.00"),
        ];
        let asc = visible_indices(&records, &sorted(SortKey::PriceCzk, SortDirection::Ascending));
        assert_eq!(ids(&records, &asc), vec![4, 2, 1, 3]);
        let desc = visible_indices(&records, &sorted(SortKey::PriceCzk, SortDirection::Descending));
        assert_eq!(ids(&records, &desc), vec![1, 3, 2, 4]);
    }

    #[test]
    fn nan_price_is_never_replaced_by_dedup() {
        let records = vec![
            record(1, "Prague", "Czechia", "Europe", "n/a"),
            record(2, "Prague", "Czechia", "Europe", "10.00"),
        ];
        let visible = visible_indices(&records, &FilterState::default());
        assert_eq!(ids(&records, &visible), vec![1]);
    }

    #[test]
    fn run_query_bundles_facets_and_counts() {
        let records = vec![
            record(1, "Prague", "Czechia", "Europe", "100.00"),
            record(2, "Vienna", "Austria", "Europe", "120.00"),
            record(3, "Tokyo", "Japan", "Asia", "300.00"),
        ];
        let filters = FilterState {
            continent: Some("Europe".into()),
            ..FilterState::default()
        };
        let view = run_query(&records, &filters);
        assert_eq!(view.continents, vec!["Asia", "Europe"]);
        assert_eq!(view.countries, vec!["Austria", "Czechia"]);
        assert_eq!(ids(&records, &view.visible), vec![1, 2]);
        assert_eq!(view.total, 3);
    }

    #[test]
    fn empty_input_gives_empty_view() {
        let view = run_query(&[], &FilterState::default());
        assert_eq!(view, QueryView::default());
    }

    // -- properties --

    const CITIES: [&str; 5] = ["Prague", "Brno", "Tokyo", "Lima", "Oslo"];
    const PLACES: [(&str, &str); 4] = [
        ("Czechia", "Europe"),
        ("Norway", "Europe"),
        ("Japan", "Asia"),
        ("Peru", "South America"),
    ];

    fn arb_records() -> impl Strategy<Value = Vec<PriceRecord>> {
        prop::collection::vec((0usize..5, 0usize..4, 0u32..20), 0..40).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (c, p, price))| {
                    let (country, continent) = PLACES[p];
                    record(i as i64, CITIES[c], country, continent, &format!("{price}.00"))
                })
                .collect()
        })
    }

    fn id_set(records: &[PriceRecord], filters: &FilterState) -> HashSet<i64> {
        ids(records, &visible_indices(records, filters)).into_iter().collect()
    }

    proptest! {
        #[test]
        fn combined_filters_are_the_intersection(
            records in arb_records(),
            p in 0usize..4,
            term in prop::sample::select(vec!["", "o", "PR", "asia", "zz"]),
        ) {
            let (country, continent) = PLACES[p];
            let base = FilterState { remove_duplicates: false, ..FilterState::default() };
            let only_continent = FilterState { continent: Some(continent.into()), ..base.clone() };
            let only_country = FilterState { country: Some(country.into()), ..base.clone() };
            let only_search = FilterState { search_term: term.into(), ..base.clone() };
            let all = FilterState {
                continent: Some(continent.into()),
                country: Some(country.into()),
                search_term: term.into(),
                ..base
            };

            let expected: HashSet<i64> = id_set(&records, &only_continent)
                .intersection(&id_set(&records, &only_country))
                .copied()
                .collect::<HashSet<_>>()
                .intersection(&id_set(&records, &only_search))
                .copied()
                .collect();
            prop_assert_eq!(id_set(&records, &all), expected);
        }

        #[test]
        fn dedup_keeps_one_cheapest_row_per_city(records in arb_records()) {
            let visible = visible_indices(&records, &FilterState::default());
            let kept: Vec<&PriceRecord> = visible.iter().map(|&i| &records[i]).collect();

            let cities: HashSet<&str> = records.iter().map(|r| r.city.as_str()).collect();
            prop_assert_eq!(kept.len(), cities.len());

            for rec in kept {
                let same_city: Vec<&PriceRecord> =
                    records.iter().filter(|r| r.city == rec.city).collect();
                let min = same_city
                    .iter()
                    .map(|r| r.price_value())
                    .fold(f64::INFINITY, f64::min);
                prop_assert_eq!(rec.price_value(), min);
                let first_min = same_city.iter().find(|r| r.price_value() == min).map(|r| r.id);
                prop_assert_eq!(Some(rec.id), first_min);
            }
        }

        #[test]
        fn direction_flip_only_reverses_distinct_prices(records in arb_records()) {
            let asc_filters = sorted(SortKey::PriceCzk, SortDirection::Ascending);
            let desc_filters = sorted(SortKey::PriceCzk, SortDirection::Descending);
            let asc = visible_indices(&records, &asc_filters);
            let desc = visible_indices(&records, &desc_filters);
            let price = |i: usize| records[i].price_value();
            prop_assert_eq!(asc.len(), desc.len());
            prop_assert!(desc.windows(2).all(|w| price(w[0]) >= price(w[1])));
            // Equal prices appear in source order in both directions.
            for order in [&asc, &desc] {
                for w in order.windows(2) {
                    if records[w[0]].price_value() == records[w[1]].price_value() {
                        prop_assert!(w[0] < w[1]);
                    }
                }
            }
        }
    }
}
