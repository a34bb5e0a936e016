use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Decimal128Type, Float32Type, Float64Type, Int32Type, Int64Type, Schema,
};
use arrow::temporal_conversions::date32_to_datetime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{PriceDataset, PriceRecord};

// Accepted spellings per field: API (camelCase) first, storage column second.
const ID: &[&str] = &["id"];
const CITY: &[&str] = &["city"];
const COUNTRY: &[&str] = &["country"];
const CONTINENT: &[&str] = &["continent"];
const PRICE: &[&str] = &["priceCzk", "price_czk"];
const CREATED_AT: &[&str] = &["createdAt", "created_at"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load price records from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `[{ "id": 1, "city": ..., "priceCzk": "129.90", ... }, ...]`
/// * `.csv`     – header row naming the same fields
/// * `.parquet` – one column per field, as written by the `prices` table export
pub fn load_file(path: &Path) -> Result<PriceDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    log::debug!("Reading {} as .{ext}", path.display());

    let records = match ext.as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    Ok(PriceDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (what the price API returns):
///
/// ```json
/// [
///   {
///     "id": 1,
///     "city": "Prague",
///     "country": "Czechia",
///     "continent": "Europe",
///     "priceCzk": "129.90",
///     "createdAt": "2024-03-01"
///   },
///   ...
/// ]
/// ```
///
/// `priceCzk` may also be a bare number and `createdAt` may be null or missing;
/// the storage column names (`price_czk`, `created_at`) are accepted too.
fn load_json(path: &Path) -> Result<Vec<PriceRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| PriceRecord::deserialize(row).with_context(|| format!("Row {i}")))
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Cells are kept verbatim; an empty `created_at` cell means "absent".
fn load_csv(path: &Path) -> Result<Vec<PriceRecord>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let find = |names: &[&str]| headers.iter().position(|h| names.iter().any(|n| h == n));
    let require = |names: &[&str]| {
        find(names).with_context(|| format!("CSV missing '{}' column", names[0]))
    };

    let id_idx = require(ID)?;
    let city_idx = require(CITY)?;
    let country_idx = require(COUNTRY)?;
    let continent_idx = require(CONTINENT)?;
    let price_idx = require(PRICE)?;
    let created_idx = find(CREATED_AT);

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: usize| row.get(idx).unwrap_or("").to_string();

        let id_text = cell(id_idx);
        let id = id_text
            .trim()
            .parse::<i64>()
            .with_context(|| format!("CSV row {row_no}: id '{id_text}' is not an integer"))?;

        records.push(PriceRecord {
            id,
            city: cell(city_idx),
            country: cell(country_idx),
            continent: cell(continent_idx),
            price_czk: cell(price_idx),
            created_at: created_idx.map(cell).filter(|s| !s.is_empty()),
        });
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export of the price table.
///
/// Expected schema:
/// - `id`: Int32 or Int64
/// - `city`, `country`, `continent`: Utf8 / LargeUtf8 / Utf8View
/// - `price_czk` (or `priceCzk`): Decimal128, Float64/Float32 or text
/// - `created_at` (or `createdAt`, optional): Date32 or text, nullable
fn load_parquet(path: &Path) -> Result<Vec<PriceRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let id_col = batch.column(index_of_any(&schema, ID)?);
        let city_col = batch.column(index_of_any(&schema, CITY)?);
        let country_col = batch.column(index_of_any(&schema, COUNTRY)?);
        let continent_col = batch.column(index_of_any(&schema, CONTINENT)?);
        let price_col = batch.column(index_of_any(&schema, PRICE)?);
        let created_col = index_of_any(&schema, CREATED_AT).ok().map(|i| batch.column(i));

        for row in 0..batch.num_rows() {
            let row_no = records.len();
            let at = move |col: &str| format!("Row {row_no}: failed to read '{col}'");

            records.push(PriceRecord {
                id: extract_id(id_col, row).with_context(|| at("id"))?,
                city: extract_text(city_col, row).with_context(|| at("city"))?,
                country: extract_text(country_col, row).with_context(|| at("country"))?,
                continent: extract_text(continent_col, row).with_context(|| at("continent"))?,
                price_czk: extract_price(price_col, row).with_context(|| at("price_czk"))?,
                created_at: match created_col {
                    Some(col) => extract_date(col, row).with_context(|| at("created_at"))?,
                    None => None,
                },
            });
        }
    }

    Ok(records)
}

// -- Parquet / Arrow helpers --

fn index_of_any(schema: &Schema, names: &[&str]) -> Result<usize> {
    names
        .iter()
        .find_map(|name| schema.index_of(name).ok())
        .ok_or_else(|| anyhow!("Parquet file missing '{}' column", names[0]))
}

fn extract_id(col: &ArrayRef, row: usize) -> Result<i64> {
    if col.is_null(row) {
        bail!("null id");
    }
    match col.data_type() {
        DataType::Int32 => Ok(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Ok(col.as_primitive::<Int64Type>().value(row)),
        other => bail!("Expected Int32 or Int64 id column, got {other:?}"),
    }
}

fn extract_text(col: &ArrayRef, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in required text column");
    }
    match col.data_type() {
        DataType::Utf8 => Ok(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        DataType::Utf8View => Ok(col.as_string_view().value(row).to_string()),
        other => bail!("Expected a string column, got {other:?}"),
    }
}

/// Prices keep their fixed-point text form regardless of storage type.
fn extract_price(col: &ArrayRef, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null price");
    }
    match col.data_type() {
        DataType::Decimal128(_, _) => Ok(col.as_primitive::<Decimal128Type>().value_as_string(row)),
        DataType::Float64 => Ok(format!("{:.2}", col.as_primitive::<Float64Type>().value(row))),
        DataType::Float32 => Ok(format!("{:.2}", col.as_primitive::<Float32Type>().value(row))),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => extract_text(col, row),
        other => bail!("Unsupported price column type {other:?}"),
    }
}

fn extract_date(col: &ArrayRef, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Date32 => {
            let days = col.as_primitive::<Date32Type>().value(row);
            Ok(date32_to_datetime(days).map(|dt| dt.date().to_string()))
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            extract_text(col, row).map(Some)
        }
        other => bail!("Unsupported created_at column type {other:?}"),
    }
}
