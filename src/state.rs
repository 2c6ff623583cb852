use std::path::Path;

use crate::color::ColorMap;
use crate::data::export;
use crate::data::filter::{
    self, FilteredView, GateFailure, LabelFilters, MissingColumnWarning, Selection, check_gate,
};
use crate::data::loader::{self, LoadError};
use crate::data::model::RecordTable;
use crate::data::{CLUSTER_COLUMN, DBSCAN_COLUMN};

// ---------------------------------------------------------------------------
// Session phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing uploaded yet, or the last upload failed to parse.
    NoTable,
    /// A table is loaded but cannot be visualised.
    GateFailed(GateFailure),
    Ready,
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Everything one user session owns, independent of rendering.
#[derive(Default)]
pub struct Session {
    /// Loaded table (None until a file parses successfully).
    pub table: Option<RecordTable>,

    /// Name of the uploaded file, for display.
    pub file_name: Option<String>,

    /// The two selector values.
    pub filters: LabelFilters,

    /// Rows passing the current filters (cached).
    pub view: FilteredView,

    /// Colours for the map grouping column, built over the whole table.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Session {
    pub fn phase(&self) -> SessionPhase {
        match &self.table {
            None => SessionPhase::NoTable,
            Some(table) => match check_gate(table) {
                Ok(()) => SessionPhase::Ready,
                Err(gate) => SessionPhase::GateFailed(gate),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == SessionPhase::Ready
    }

    /// Load an uploaded file from disk.
    pub fn load_path(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let result = loader::load_file(path);
        self.finish_load(name, result);
    }

    /// Load an uploaded byte stream (e.g. a file dropped onto the window).
    pub fn load_bytes(&mut self, name: &str, bytes: &[u8]) {
        let result = loader::load_bytes(bytes).map_err(LoadError::from);
        self.finish_load(name.to_string(), result);
    }

    fn finish_load(&mut self, name: String, result: Result<RecordTable, LoadError>) {
        match result {
            Ok(table) => {
                log::info!(
                    "Loaded {name}: {} rows with columns {:?}",
                    table.len(),
                    table.columns
                );
                self.set_table(name, table);
            }
            Err(e) => {
                log::error!("Failed to load {name}: {e:#}");
                self.clear();
                self.status_message = Some(format!("Failed to process file. Error: {e}"));
            }
        }
    }

    /// Replace the table and reset both selections to `All`.
    pub fn set_table(&mut self, name: String, table: RecordTable) {
        if let Err(gate) = check_gate(&table) {
            log::warn!("{name} cannot be visualised: {gate}");
        }
        self.color_map = filter::color_column(&table).map(|column| {
            let labels: Vec<String> = filter::available_values(&table, column)
                .into_iter()
                .filter_map(|s| match s {
                    Selection::All => None,
                    Selection::Value(v) => Some(v),
                })
                .collect();
            ColorMap::new(column, labels.iter().map(String::as_str))
        });
        self.table = Some(table);
        self.file_name = Some(name);
        self.filters = LabelFilters::default();
        self.status_message = None;
        self.refilter();
    }

    /// Drop the table and every derived value.
    pub fn clear(&mut self) {
        *self = Session::default();
    }

    /// Recompute `view` after a selection change. Empty unless the gate passes.
    pub fn refilter(&mut self) {
        self.view = match &self.table {
            Some(table) if check_gate(table).is_ok() => filter::filter(table, &self.filters),
            _ => FilteredView::default(),
        };
    }

    pub fn set_cluster_selection(&mut self, selection: Selection) {
        if self.accepts(CLUSTER_COLUMN, &selection) {
            log::debug!("cluster selection -> {selection}");
            self.filters.cluster = selection;
            self.refilter();
        }
    }

    pub fn set_dbscan_selection(&mut self, selection: Selection) {
        if self.accepts(DBSCAN_COLUMN, &selection) {
            log::debug!("dbscan_cluster selection -> {selection}");
            self.filters.dbscan = selection;
            self.refilter();
        }
    }

    /// Values may only be picked on a column the table has.
    fn accepts(&self, column: &str, selection: &Selection) -> bool {
        match selection {
            Selection::All => true,
            Selection::Value(_) => self.table.as_ref().is_some_and(|t| t.has_column(column)),
        }
    }

    /// Selector options for a label column.
    pub fn options(&self, column: &str) -> Vec<Selection> {
        match &self.table {
            Some(table) if self.is_ready() => filter::available_values(table, column),
            _ => vec![Selection::All],
        }
    }

    /// Per-label counts over the filtered view; `None` if the column is
    /// absent or the gate fails.
    pub fn frequency(&self, column: &str) -> Option<Vec<(String, usize)>> {
        let table = self.table.as_ref().filter(|_| self.is_ready())?;
        filter::frequency(table, &self.view, column)
    }

    pub fn color_column(&self) -> Option<&'static str> {
        self.table.as_ref().and_then(filter::color_column)
    }

    pub fn warnings(&self) -> Vec<MissingColumnWarning> {
        self.table
            .as_ref()
            .map(filter::missing_label_columns)
            .unwrap_or_default()
    }

    pub fn total_rows(&self) -> usize {
        self.table.as_ref().map_or(0, RecordTable::len)
    }

    pub fn filtered_rows(&self) -> usize {
        self.view.len()
    }

    /// Write the filtered view to `path` (.csv or .json).
    pub fn export_to(&mut self, path: &Path) {
        let Some(table) = &self.table else {
            return;
        };
        match export::export_file(table, &self.view, path) {
            Ok(()) => {
                self.status_message = Some(format!(
                    "Exported {} rows to {}",
                    self.view.len(),
                    path.display()
                ));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }
}
