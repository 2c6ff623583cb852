use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::Selection;
use crate::data::{CLUSTER_COLUMN, DBSCAN_COLUMN};
use crate::state::Session;

// ---------------------------------------------------------------------------
// Left side panel – upload and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: file upload, the two label selectors, row counts.
pub fn side_panel(ui: &mut Ui, state: &mut Session) {
    ui.heading("Upload data");
    ui.separator();

    if ui.button("Choose CSV file…").clicked() {
        open_file_dialog(state);
    }
    match &state.file_name {
        Some(name) => {
            ui.label(RichText::new(name).strong());
        }
        None => {
            ui.weak("…or drop a .csv file onto the window.");
        }
    }
    ui.add_space(8.0);

    if !state.is_ready() {
        return;
    }

    ui.heading("Filter options");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let cluster_options = state.options(CLUSTER_COLUMN);
            let dbscan_options = state.options(DBSCAN_COLUMN);

            if let Some(choice) = selector(
                ui,
                CLUSTER_COLUMN,
                "Filter by 'cluster' (K-Means):",
                &state.filters.cluster,
                &cluster_options,
            ) {
                state.set_cluster_selection(choice);
            }
            ui.add_space(4.0);

            if let Some(choice) = selector(
                ui,
                DBSCAN_COLUMN,
                "Filter by 'dbscan_cluster' (DBSCAN):",
                &state.filters.dbscan,
                &dbscan_options,
            ) {
                state.set_dbscan_selection(choice);
            }

            for warning in state.warnings() {
                ui.colored_label(Color32::YELLOW, warning.to_string());
            }

            ui.separator();
            let filtered = format!("Rows after filter: {}", state.filtered_rows());
            ui.label(RichText::new(filtered).strong());
            ui.label(RichText::new(format!("Total rows: {}", state.total_rows())).strong());

            if let Some(cm) = &state.color_map {
                ui.separator();
                ui.strong(format!("Map colours ({})", cm.column));
                for (label, color) in cm.legend_entries() {
                    ui.label(RichText::new(format!("● {label}")).color(color));
                }
            }
        });
}

/// One single-select dropdown. Returns the newly picked option, if any.
/// A column absent from the table gets no dropdown.
fn selector(
    ui: &mut Ui,
    column: &str,
    label: &str,
    current: &Selection,
    options: &[Selection],
) -> Option<Selection> {
    if options.len() <= 1 && *current == Selection::All {
        return None;
    }
    ui.label(label);
    let mut picked = None;
    egui::ComboBox::from_id_salt(column)
        .selected_text(current.to_string())
        .width(ui.available_width() * 0.9)
        .show_ui(ui, |ui: &mut Ui| {
            for option in options {
                if ui
                    .selectable_label(current == option, option.to_string())
                    .clicked()
                    && current != option
                {
                    picked = Some(option.clone());
                }
            }
        });
    picked
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut Session) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.is_ready();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered rows…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.is_ready() {
            ui.label(format!(
                "{} rows loaded, {} shown",
                state.total_rows(),
                state.filtered_rows()
            ));
            ui.separator();
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut Session) {
    let file = rfd::FileDialog::new()
        .set_title("Choose earthquake CSV file")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn save_file_dialog(state: &mut Session) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered rows")
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .set_file_name("filtered.csv")
        .save_file();

    if let Some(path) = file {
        state.export_to(&path);
    }
}
