use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

const ALL_CONTINENTS: &str = "All Continents";
const ALL_COUNTRIES: &str = "All Countries";

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Clone what we need so we can mutate state inside the widgets.
    let continents = state.view.continents.clone();
    let countries = state.view.countries.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Free-text search ----
            ui.strong("Search");
            let mut term = state.filters.search_term.clone();
            let search =
                egui::TextEdit::singleline(&mut term).hint_text("Search by city, country...");
            if ui.add(search).changed() {
                state.set_search_term(term);
            }
            ui.add_space(6.0);

            // ---- Continent ----
            ui.strong("Continent");
            let current = state.filters.active_continent().map(str::to_string);
            egui::ComboBox::from_id_salt("continent")
                .selected_text(current.as_deref().unwrap_or(ALL_CONTINENTS))
                .show_ui(ui, |ui: &mut Ui| {
                    if ui.selectable_label(current.is_none(), ALL_CONTINENTS).clicked() {
                        state.select_continent(None);
                    }
                    for continent in &continents {
                        let selected = current.as_deref() == Some(continent.as_str());
                        if ui.selectable_label(selected, continent.as_str()).clicked() {
                            state.select_continent(Some(continent.clone()));
                        }
                    }
                });
            ui.add_space(6.0);

            // ---- Country (options follow the continent) ----
            ui.strong("Country");
            let current = state.filters.active_country().map(str::to_string);
            egui::ComboBox::from_id_salt("country")
                .selected_text(current.as_deref().unwrap_or(ALL_COUNTRIES))
                .show_ui(ui, |ui: &mut Ui| {
                    if ui.selectable_label(current.is_none(), ALL_COUNTRIES).clicked() {
                        state.select_country(None);
                    }
                    for country in &countries {
                        let selected = current.as_deref() == Some(country.as_str());
                        if ui.selectable_label(selected, country.as_str()).clicked() {
                            state.select_country(Some(country.clone()));
                        }
                    }
                });
            ui.separator();

            let mut dedup = state.filters.remove_duplicates;
            if ui.checkbox(&mut dedup, "Show only lowest price per city").changed() {
                state.set_remove_duplicates(dedup);
            }

            ui.add_space(6.0);
            if ui.button("Reset").clicked() {
                state.reset();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.dataset.is_some() {
            let (visible, total) = state.result_counts();
            ui.label(format!("Showing {visible} of {total} results"));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open price data")
        .add_filter("Supported files", &["json", "csv", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
