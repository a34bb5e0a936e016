use std::path::Path;

use crate::color::ColorMap;
use crate::data::filter::{FilterState, SortKey};
use crate::data::model::{PriceDataset, PriceRecord};
use crate::data::query::{run_query, QueryView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<PriceDataset>,

    /// Current search / facet / sort selections.
    pub filters: FilterState,

    /// Facets and visible rows for the current filters (cached).
    pub view: QueryView,

    /// Continent colours for the table.
    pub continent_colors: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded dataset. Selections survive a reload.
    pub fn set_dataset(&mut self, dataset: PriceDataset) {
        self.dataset = Some(dataset);
        self.refresh();

        self.continent_colors = Some(ColorMap::new(&self.view.continents));
        self.status_message = None;
    }

    /// Load a file, reporting failures in the status line.
    pub fn load_path(&mut self, path: &Path) {
        match crate::data::loader::load_file(path) {
            Ok(dataset) => {
                log::info!("Loaded {} price records from {}", dataset.len(), path.display());
                if dataset.is_empty() {
                    log::warn!("{} contains no price records", path.display());
                }
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Recompute the view after any filter change.
    pub fn refresh(&mut self) {
        if let Some(ds) = &self.dataset {
            self.view = run_query(&ds.records, &self.filters);
            log::debug!(
                "Query: {} of {} visible, sorted by {} {:?}",
                self.view.visible.len(),
                self.view.total,
                self.filters.sort.key,
                self.filters.sort.direction
            );
        }
    }

    /// Visible records in display order.
    pub fn visible_records(&self) -> Vec<&PriceRecord> {
        match &self.dataset {
            Some(ds) => self.view.visible.iter().map(|&i| &ds.records[i]).collect(),
            None => Vec::new(),
        }
    }

    /// `(visible, total)` for the results line.
    pub fn result_counts(&self) -> (usize, usize) {
        (self.view.visible.len(), self.view.total)
    }

    pub fn set_search_term(&mut self, term: String) {
        self.filters.search_term = term;
        self.refresh();
    }

    /// Changing continent always clears the country, so the country
    /// selection stays among the countries offered for the continent.
    pub fn select_continent(&mut self, continent: Option<String>) {
        self.filters.continent = continent.filter(|c| !c.is_empty());
        self.filters.country = None;
        self.refresh();
    }

    pub fn select_country(&mut self, country: Option<String>) {
        self.filters.country = country.filter(|c| !c.is_empty());
        self.refresh();
    }

    pub fn set_remove_duplicates(&mut self, enabled: bool) {
        self.filters.remove_duplicates = enabled;
        self.refresh();
    }

    /// Column header click.
    pub fn sort_by(&mut self, key: SortKey) {
        self.filters.sort.toggle(key);
        self.refresh();
    }

    /// Reset button.
    pub fn reset(&mut self) {
        self.filters.reset();
        self.refresh();
    }
}
