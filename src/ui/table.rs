use eframe::egui::{self, Align, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::filter::SortKey;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Price table (central panel)
// ---------------------------------------------------------------------------

const ROW_HEIGHT: f32 = 20.0;

/// Render the visible records with sortable column headers.
pub fn price_table(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore prices  (File → Open…)");
        });
        return;
    }

    let sort = state.filters.sort;
    let mut clicked: Option<SortKey> = None;

    let records = state.visible_records();
    let colors = state.continent_colors.as_ref();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::auto().at_least(140.0))
        .column(Column::auto().at_least(140.0))
        .column(Column::auto().at_least(140.0))
        .column(Column::remainder().at_least(100.0))
        .header(ROW_HEIGHT + 4.0, |mut header| {
            for key in SortKey::ALL {
                header.col(|ui: &mut Ui| {
                    let label = RichText::new(sort.header_label(key)).strong();
                    if ui.add(egui::Button::new(label).frame(false)).clicked() {
                        clicked = Some(key);
                    }
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, records.len(), |mut row| {
                let rec = records[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(rec.city.as_str());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.country.as_str());
                });
                row.col(|ui: &mut Ui| {
                    let mut text = RichText::new(rec.continent.as_str());
                    if let Some(cm) = colors {
                        text = text.color(cm.color_for(&rec.continent));
                    }
                    ui.label(text);
                });
                row.col(|ui: &mut Ui| {
                    ui.monospace(rec.price_czk.as_str());
                });
            });
        });

    if let Some(key) = clicked {
        state.sort_by(key);
    }
}
