/// Data layer: table model, loading, filtering and export.
///
/// Architecture:
/// ```text
///    uploaded .csv bytes
///          │
///          ▼
///    ┌──────────┐
///    │  loader   │  parse → RecordTable, normalize label columns
///    └──────────┘
///          │
///          ▼
///    ┌─────────────┐
///    │ RecordTable  │  columns + rows of CellValue
///    └─────────────┘
///          │
///          ▼
///    ┌──────────┐
///    │  filter   │  gate, selections → FilteredView, frequencies
///    └──────────┘
///          │
///          ▼
///    ┌──────────┐
///    │  export   │  FilteredView → .csv / .json
///    └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;

pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";
/// Centroid-based (K-Means) cluster label.
pub const CLUSTER_COLUMN: &str = "cluster";
/// Density-based (DBSCAN) cluster label.
pub const DBSCAN_COLUMN: &str = "dbscan_cluster";

/// Display text for "no cluster assigned".
pub const NA_MARKER: &str = "N/A";
