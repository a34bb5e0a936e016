use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, Date32Array, Decimal128Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::temporal_conversions::date32_to_datetime;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// 2024-01-01 as days since the Unix epoch.
const FIRST_DAY: i32 = 19723;

const CITIES: &[(&str, &str, &str, f64)] = &[
    ("Prague", "Czechia", "Europe", 95.0),
    ("Brno", "Czechia", "Europe", 80.0),
    ("Vienna", "Austria", "Europe", 120.0),
    ("Berlin", "Germany", "Europe", 110.0),
    ("Oslo", "Norway", "Europe", 180.0),
    ("Lisbon", "Portugal", "Europe", 85.0),
    ("Tokyo", "Japan", "Asia", 140.0),
    ("Bangkok", "Thailand", "Asia", 60.0),
    ("Hanoi", "Vietnam", "Asia", 45.0),
    ("New York", "USA", "North America", 210.0),
    ("Mexico City", "Mexico", "North America", 70.0),
    ("Lima", "Peru", "South America", 65.0),
    ("Buenos Aires", "Argentina", "South America", 75.0),
    ("Nairobi", "Kenya", "Africa", 55.0),
    ("Cape Town", "South Africa", "Africa", 90.0),
    ("Sydney", "Australia", "Oceania", 170.0),
];

#[derive(Parser)]
#[command(name = "generate_sample", about = "Write deterministic sample price records")]
struct Args {
    /// Output file; the extension picks the format (.parquet, .json, .csv).
    #[arg(default_value = "sample_prices.parquet")]
    output: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Same field names the explorer's JSON/CSV loader reads.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Row {
    id: i64,
    city: String,
    country: String,
    continent: String,
    price_czk: String,
    created_at: Option<String>,
    #[serde(skip)]
    price_cents: i128,
    #[serde(skip)]
    created_days: Option<i32>,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// One to four price observations per city, each within ±15% of the base.
fn generate_rows(seed: u64) -> Vec<Row> {
    let mut rng = SimpleRng::new(seed);
    let mut rows = Vec::new();

    for &(city, country, continent, base) in CITIES {
        let observations = 1 + rng.next_u64() % 4;
        for _ in 0..observations {
            let price = base * (0.85 + 0.3 * rng.next_f64());
            let price_cents = (price * 100.0).round() as i128;
            let created_days =
                (rng.next_f64() >= 0.2).then(|| FIRST_DAY + (rng.next_u64() % 366) as i32);

            rows.push(Row {
                id: rows.len() as i64 + 1,
                city: city.to_string(),
                country: country.to_string(),
                continent: continent.to_string(),
                price_czk: format!("{}.{:02}", price_cents / 100, price_cents % 100),
                created_at: created_days
                    .and_then(date32_to_datetime)
                    .map(|dt| dt.date().to_string()),
                price_cents,
                created_days,
            });
        }
    }
    rows
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("city", DataType::Utf8, false),
        Field::new("country", DataType::Utf8, false),
        Field::new("continent", DataType::Utf8, false),
        Field::new("price_czk", DataType::Decimal128(10, 2), false),
        Field::new("created_at", DataType::Date32, true),
    ]));

    let price = Decimal128Array::from(rows.iter().map(|r| r.price_cents).collect::<Vec<_>>())
        .with_precision_and_scale(10, 2)
        .context("building price column")?;

    let text = |field: fn(&Row) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(field).collect::<Vec<_>>()))
    };

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(rows.iter().map(|r| r.id).collect::<Vec<_>>())),
            text(|r| r.city.as_str()),
            text(|r| r.country.as_str()),
            text(|r| r.continent.as_str()),
            Arc::new(price),
            Arc::new(Date32Array::from(rows.iter().map(|r| r.created_days).collect::<Vec<_>>())),
        ],
    )
    .context("Failed to create RecordBatch")?;

    let file = std::fs::File::create(path).context("Failed to create output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;

    arrow::util::pretty::print_batches(&[batch.slice(0, batch.num_rows().min(5))])
        .context("printing preview")?;
    Ok(())
}

fn write_json(path: &Path, rows: &[Row]) -> Result<()> {
    let file = std::fs::File::create(path).context("Failed to create output file")?;
    serde_json::to_writer_pretty(file, rows).context("writing JSON")
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("Failed to create output file")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let rows = generate_rows(args.seed);

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => write_parquet(&args.output, &rows)?,
        "json" => write_json(&args.output, &rows)?,
        "csv" => write_csv(&args.output, &rows)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    println!(
        "Wrote {} price records for {} cities to {}",
        rows.len(),
        CITIES.len(),
        args.output.display()
    );
    Ok(())
}
