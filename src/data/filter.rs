use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

use super::model::{CellValue, RecordTable};
use super::{CLUSTER_COLUMN, DBSCAN_COLUMN, LATITUDE_COLUMN, LONGITUDE_COLUMN};

// ---------------------------------------------------------------------------
// Selection: "All" or one label value, per label column
// ---------------------------------------------------------------------------

/// One selector's choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Selection {
    /// Wildcard: no constraint on the column.
    #[default]
    All,
    Value(String),
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "All"),
            Selection::Value(v) => write!(f, "{v}"),
        }
    }
}

/// The two independent selector values of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelFilters {
    pub cluster: Selection,
    pub dbscan: Selection,
}

// ---------------------------------------------------------------------------
// FilteredView: row indices into the source table
// ---------------------------------------------------------------------------

/// Row subset of a [`RecordTable`], in source order. Never owns or mutates
/// the table it was computed from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    pub indices: Vec<usize>,
}

impl FilteredView {
    /// View containing every row of `table`.
    pub fn all(table: &RecordTable) -> Self {
        FilteredView {
            indices: (0..table.len()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The selected rows of `table`.
    pub fn rows<'a>(
        &'a self,
        table: &'a RecordTable,
    ) -> impl Iterator<Item = &'a [CellValue]> + 'a {
        self.indices
            .iter()
            .filter_map(move |&i| table.rows.get(i).map(Vec::as_slice))
    }
}

// ---------------------------------------------------------------------------
// Gate and warnings
// ---------------------------------------------------------------------------

/// Why a loaded table cannot be visualised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateFailure {
    #[error("the uploaded table has no rows")]
    Empty,
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Everything downstream (filters, charts, table) requires a non-empty
/// table with both coordinate columns.
pub fn check_gate(table: &RecordTable) -> Result<(), GateFailure> {
    if table.is_empty() {
        return Err(GateFailure::Empty);
    }
    let missing: Vec<String> = [LATITUDE_COLUMN, LONGITUDE_COLUMN]
        .into_iter()
        .filter(|c| !table.has_column(c))
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(GateFailure::MissingColumns(missing))
    }
}

/// Non-fatal: a label column is absent, so its selector and chart are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingColumnWarning {
    pub column: &'static str,
}

impl fmt::Display for MissingColumnWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column '{}' not found.", self.column)
    }
}

pub fn missing_label_columns(table: &RecordTable) -> Vec<MissingColumnWarning> {
    [CLUSTER_COLUMN, DBSCAN_COLUMN]
        .into_iter()
        .filter(|c| !table.has_column(c))
        .map(|column| MissingColumnWarning { column })
        .collect()
}

// ---------------------------------------------------------------------------
// Selector options, filtering and aggregation
// ---------------------------------------------------------------------------

/// Options for one selector: `All` followed by the distinct values of
/// `column` in plain string order (so `"10"` sorts before `"2"`).
/// Only `All` when the column is absent.
pub fn available_values(table: &RecordTable, column: &str) -> Vec<Selection> {
    let distinct: BTreeSet<String> = table
        .column_values(column)
        .unwrap_or_default()
        .into_iter()
        .map(label_text)
        .collect();

    std::iter::once(Selection::All)
        .chain(distinct.into_iter().map(Selection::Value))
        .collect()
}

/// Rows matching both selections. A selection on an absent column is ignored.
pub fn filter(table: &RecordTable, filters: &LabelFilters) -> FilteredView {
    let cluster_idx = table.column_index(CLUSTER_COLUMN);
    let dbscan_idx = table.column_index(DBSCAN_COLUMN);

    let indices = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            keeps(row, cluster_idx, &filters.cluster) && keeps(row, dbscan_idx, &filters.dbscan)
        })
        .map(|(i, _)| i)
        .collect();

    FilteredView { indices }
}

/// Row count per distinct value of `column` within `view`, most frequent
/// first (ties by label). `None` if the column is absent.
pub fn frequency(
    table: &RecordTable,
    view: &FilteredView,
    column: &str,
) -> Option<Vec<(String, usize)>> {
    let idx = table.column_index(column)?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in view.rows(table) {
        if let Some(cell) = row.get(idx) {
            *counts.entry(label_text(cell)).or_default() += 1;
        }
    }

    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    Some(out)
}

/// Map grouping column: DBSCAN labels when present, else K-Means labels.
pub fn color_column(table: &RecordTable) -> Option<&'static str> {
    [DBSCAN_COLUMN, CLUSTER_COLUMN]
        .into_iter()
        .find(|c| table.has_column(c))
}

// -- helpers --

fn keeps(row: &[CellValue], idx: Option<usize>, selection: &Selection) -> bool {
    match (selection, idx) {
        (Selection::All, _) | (_, None) => true,
        (Selection::Value(wanted), Some(i)) => row.get(i).is_some_and(|cell| match cell {
            CellValue::Text(s) => s == wanted,
            other => other.to_string() == *wanted,
        }),
    }
}

fn label_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(s) => s.clone(),
        other => other.to_string(),
    }
}
