// ---------------------------------------------------------------------------
// Viewer configuration
// ---------------------------------------------------------------------------

/// Window and layout constants. Logging verbosity is set with `RUST_LOG`.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
    pub side_panel_width: f32,
    pub map_height: f32,
    pub map_point_radius: f32,
    pub bar_chart_height: f32,
    pub table_row_height: f32,
    /// Height cap of the raw data table before it scrolls.
    pub table_max_height: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Earthquake Cluster Viewer".to_string(),
            window_size: [1280.0, 900.0],
            min_window_size: [700.0, 500.0],
            side_panel_width: 260.0,
            map_height: 560.0,
            map_point_radius: 2.5,
            bar_chart_height: 280.0,
            table_row_height: 18.0,
            table_max_height: 420.0,
        }
    }
}
