use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// PriceRecord – one row of the price table
// ---------------------------------------------------------------------------

/// A single price observation for a city.
///
/// Records are never mutated once loaded; everything downstream works on
/// indices into the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    pub id: i64,
    pub city: String,
    pub country: String,
    pub continent: String,
    /// Fixed-point decimal text, e.g. `"129.90"`. Bare JSON numbers are
    /// accepted and rendered with two decimals.
    #[serde(alias = "price_czk", deserialize_with = "price_text")]
    pub price_czk: String,
    /// ISO-8601 date, absent for rows that were never stamped.
    #[serde(alias = "created_at", default)]
    pub created_at: Option<String>,
}

impl PriceRecord {
    /// Numeric price used for deduplication and sorting, read with
    /// [`parse_leading_float`].
    pub fn price_value(&self) -> f64 {
        parse_leading_float(&self.price_czk)
    }
}

fn price_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Text(String),
        Number(f64),
    }

    Ok(match Price::deserialize(deserializer)? {
        Price::Text(text) => text,
        Price::Number(value) => format!("{value:.2}"),
    })
}

// ---------------------------------------------------------------------------
// Price text and label ordering
// ---------------------------------------------------------------------------

/// Read the longest decimal number at the start of `text`, after leading
/// whitespace: `[+-]?(digits[.digits]|.digits)([eE][+-]?digits)?`, or a
/// signed `Infinity`. Trailing text is ignored (`"12.50 CZK"` is 12.5).
/// Anything else, including `inf` and `nan`, is `NaN`.
pub fn parse_leading_float(text: &str) -> f64 {
    let s = text.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    let bytes = s.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }

    // The exponent only counts when it has digits: "1e" reads as 1.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Label order used for facets and the text sort keys: UTF-16 code units,
/// which puts characters beyond U+FFFF before U+E000..U+FFFF.
pub fn utf16_cmp(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

// ---------------------------------------------------------------------------
// PriceDataset – the complete loaded record set
// ---------------------------------------------------------------------------

/// All records in source order.
#[derive(Debug, Clone, Default)]
pub struct PriceDataset {
    pub records: Vec<PriceRecord>,
}

impl PriceDataset {
    /// Wrap loaded records. Duplicate ids are reported but kept.
    pub fn from_records(records: Vec<PriceRecord>) -> Self {
        let mut seen = HashSet::with_capacity(records.len());
        for rec in &records {
            if !seen.insert(rec.id) {
                log::warn!("Duplicate record id {} ({})", rec.id, rec.city);
            }
        }
        PriceDataset { records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
