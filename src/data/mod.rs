/// Data layer: core types, loading, and the query pipeline.
///
/// Architecture:
/// ```text
///  .json / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → PriceDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ PriceDataset  │  Vec<PriceRecord> in source order
///   └──────────────┘
///        │            FilterState (search, continent, country,
///        ▼                         dedup, sort)
///   ┌──────────┐          │
///   │  query    │ ◄───────┘  facets + filter → dedup → sort
///   └──────────┘
///        │
///        ▼
///    QueryView  (facet lists, visible indices, total)
/// ```

pub mod facets;
pub mod filter;
pub mod loader;
pub mod model;
pub mod query;
