use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Sort key / direction
// ---------------------------------------------------------------------------

/// Column the visible table is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    City,
    Country,
    Continent,
    PriceCzk,
}

impl SortKey {
    /// Table column order.
    pub const ALL: [SortKey; 4] = [
        SortKey::City,
        SortKey::Country,
        SortKey::Continent,
        SortKey::PriceCzk,
    ];

    /// Column header text.
    pub fn label(self) -> &'static str {
        match self {
            SortKey::City => "City",
            SortKey::Country => "Country",
            SortKey::Continent => "Continent",
            SortKey::PriceCzk => "Price (CZK)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort key '{0}' (expected city, country, continent or price)")]
pub struct ParseSortKeyError(String);

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "city" => Ok(SortKey::City),
            "country" => Ok(SortKey::Country),
            "continent" => Ok(SortKey::Continent),
            "price" | "priceczk" | "price_czk" => Ok(SortKey::PriceCzk),
            _ => Err(ParseSortKeyError(s.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Active sort column plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: SortKey::PriceCzk,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortConfig {
    /// Header click: the active key flips direction, any other key starts
    /// ascending.
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.toggled();
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }

    /// Arrow glyph for a column header, `None` for inactive columns.
    pub fn arrow_for(&self, key: SortKey) -> Option<&'static str> {
        (self.key == key).then(|| self.direction.arrow())
    }

    /// Header text including the arrow of the active column.
    pub fn header_label(&self, key: SortKey) -> String {
        match self.arrow_for(key) {
            Some(arrow) => format!("{} {arrow}", key.label()),
            None => key.label().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterState – caller-owned query selections
// ---------------------------------------------------------------------------

/// Everything the user has selected. `None` and `Some("")` both mean
/// "no filter" for the continent and country selections.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub search_term: String,
    pub continent: Option<String>,
    pub country: Option<String>,
    pub remove_duplicates: bool,
    pub sort: SortConfig,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            continent: None,
            country: None,
            remove_duplicates: true,
            sort: SortConfig::default(),
        }
    }
}

impl FilterState {
    /// Reset button. Unlike the initial state this leaves deduplication off.
    pub fn reset(&mut self) {
        self.search_term.clear();
        self.continent = None;
        self.country = None;
        self.remove_duplicates = false;
        self.sort = SortConfig::default();
    }

    /// Continent selection, if a non-empty one is set.
    pub fn active_continent(&self) -> Option<&str> {
        self.continent.as_deref().filter(|c| !c.is_empty())
    }

    /// Country selection, if a non-empty one is set.
    pub fn active_country(&self) -> Option<&str> {
        self.country.as_deref().filter(|c| !c.is_empty())
    }
}
