use eframe::egui::{self, ScrollArea, Ui};

use crate::config::ViewerConfig;
use crate::data::{CLUSTER_COLUMN, DBSCAN_COLUMN};
use crate::state::{Session, SessionPhase};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct QuakeVizApp {
    pub state: Session,
    pub config: ViewerConfig,
}

impl QuakeVizApp {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            state: Session::default(),
            config,
        }
    }

    /// A file dropped onto the window replaces the current upload.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };
        if let Some(path) = &file.path {
            self.state.load_path(path);
        } else if let Some(bytes) = &file.bytes {
            self.state.load_bytes(&file.name, bytes);
        }
    }

    fn dashboard(&self, ui: &mut Ui) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui: &mut Ui| {
                ui.heading("1. Earthquake distribution map");
                plot::quake_map(ui, &self.state, &self.config);
                ui.add_space(12.0);

                ui.heading("2. Cluster frequency");
                ui.label("Number of data points in each cluster.");
                ui.columns(2, |cols| {
                    plot::frequency_chart(
                        &mut cols[0],
                        &self.state,
                        CLUSTER_COLUMN,
                        "K-Means cluster distribution",
                        &self.config,
                    );
                    plot::frequency_chart(
                        &mut cols[1],
                        &self.state,
                        DBSCAN_COLUMN,
                        "DBSCAN cluster distribution",
                        &self.config,
                    );
                });
                ui.add_space(12.0);

                ui.heading("3. Raw data");
                ui.label("Rows after filtering:");
                table::raw_table(ui, &self.state, &self.config);
            });
    }
}

impl eframe::App for QuakeVizApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: upload + filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(self.config.side_panel_width)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: map, charts, table ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.phase() {
            SessionPhase::Ready => self.dashboard(ui),
            SessionPhase::NoTable => {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Upload a CSV file in the sidebar to show the visualisation.");
                });
            }
            SessionPhase::GateFailed(gate) => {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading(format!(
                        "Upload a CSV with latitude and longitude columns \
                         to show the visualisation ({gate})."
                    ));
                });
            }
        });
    }
}
