use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::config::ViewerConfig;
use crate::state::Session;

/// Raw data table of the filtered rows. The first column is the row's
/// position in the uploaded file.
pub fn raw_table(ui: &mut Ui, state: &Session, config: &ViewerConfig) {
    let Some(table) = &state.table else {
        return;
    };
    if state.view.is_empty() {
        ui.label("No rows match the current filters.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(40.0))
        .columns(Column::auto().at_least(70.0), table.columns.len())
        .max_scroll_height(config.table_max_height)
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            for name in &table.columns {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(config.table_row_height, state.view.len(), |mut row| {
                let src = state.view.indices[row.index()];
                let Some(cells) = table.rows.get(src) else {
                    return;
                };
                row.col(|ui| {
                    ui.weak(src.to_string());
                });
                for cell in cells {
                    row.col(|ui| {
                        if cell.is_null() {
                            ui.weak("NaN");
                        } else {
                            ui.label(cell.to_string());
                        }
                    });
                }
            });
        });
}
