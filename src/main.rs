mod app;
mod color;
mod data;
mod report;
mod state;
mod ui;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use app::PriceExplorerApp;
use clap::Parser;
use data::filter::{FilterState, SortConfig, SortDirection, SortKey};
use eframe::egui;
use state::AppState;

#[derive(Parser)]
#[command(name = "price-explorer", about = "Filter, deduplicate and sort city price records")]
struct Cli {
    /// Price file to open on start-up (.json, .csv, .parquet).
    path: Option<PathBuf>,

    /// Print the filtered table to stdout instead of opening a window.
    #[arg(long, requires = "path")]
    headless: bool,

    /// Case-insensitive search over city, country and continent.
    #[arg(long, default_value = "")]
    search: String,

    #[arg(long)]
    continent: Option<String>,

    #[arg(long)]
    country: Option<String>,

    /// Show every record instead of only the cheapest per city.
    #[arg(long)]
    keep_duplicates: bool,

    /// city, country, continent or price.
    #[arg(long, default_value = "price")]
    sort: SortKey,

    #[arg(long)]
    descending: bool,

    /// Emit the visible records as JSON (headless only).
    #[arg(long, requires = "headless")]
    json: bool,
}

impl Cli {
    fn filter_state(&self) -> FilterState {
        FilterState {
            search_term: self.search.clone(),
            continent: self.continent.clone(),
            country: self.country.clone(),
            remove_duplicates: !self.keep_duplicates,
            sort: SortConfig {
                key: self.sort,
                direction: if self.descending {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                },
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut state = AppState {
        filters: cli.filter_state(),
        ..AppState::default()
    };

    if let Some(path) = &cli.path {
        if cli.headless {
            return run_headless(&cli, path, state.filters);
        }
        state.load_path(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 750.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Price Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(PriceExplorerApp::with_state(state)))),
    )
    .map_err(|e| anyhow!("running the UI: {e}"))
}

fn run_headless(cli: &Cli, path: &Path, filters: FilterState) -> anyhow::Result<()> {
    let dataset = data::loader::load_file(path)?;
    log::info!("Loaded {} price records from {}", dataset.len(), path.display());

    let view = data::query::run_query(&dataset.records, &filters);
    let output = if cli.json {
        report::render_json(&dataset.records, &view)?
    } else {
        report::render_text(&dataset.records, &view, &filters.sort)
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .context("writing to stdout")?;
    if cli.json {
        writeln!(stdout).context("writing to stdout")?;
    }
    Ok(())
}
