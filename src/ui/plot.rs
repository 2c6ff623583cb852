use std::collections::BTreeMap;
use std::sync::Arc;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points};

use crate::config::ViewerConfig;
use crate::data::model::CellValue;
use crate::data::{CLUSTER_COLUMN, DBSCAN_COLUMN, LATITUDE_COLUMN, LONGITUDE_COLUMN};
use crate::state::Session;

// ---------------------------------------------------------------------------
// Earthquake map (longitude on x, latitude on y)
// ---------------------------------------------------------------------------

/// Series name when the table has no label column.
const UNGROUPED: &str = "earthquakes";

/// One plotted earthquake with the labels shown on hover.
#[derive(Debug, Clone, PartialEq)]
struct MapPoint {
    lon: f64,
    lat: f64,
    group: String,
    cluster: Option<String>,
    dbscan: Option<String>,
}

/// Filtered rows with numeric coordinates; others are left off the map.
fn map_points(state: &Session) -> Vec<MapPoint> {
    let Some(table) = &state.table else {
        return Vec::new();
    };
    let (Some(lat_idx), Some(lon_idx)) = (
        table.column_index(LATITUDE_COLUMN),
        table.column_index(LONGITUDE_COLUMN),
    ) else {
        return Vec::new();
    };
    let group_idx = state.color_column().and_then(|c| table.column_index(c));
    let cluster_idx = table.column_index(CLUSTER_COLUMN);
    let dbscan_idx = table.column_index(DBSCAN_COLUMN);
    let text_at = |row: &[CellValue], idx: Option<usize>| {
        idx.and_then(|i| row.get(i)).map(|c| c.to_string())
    };

    state
        .view
        .rows(table)
        .filter_map(|row| {
            let lat = row.get(lat_idx)?.as_f64()?;
            let lon = row.get(lon_idx)?.as_f64()?;
            Some(MapPoint {
                lon,
                lat,
                group: text_at(row, group_idx).unwrap_or_else(|| UNGROUPED.to_string()),
                cluster: text_at(row, cluster_idx),
                dbscan: text_at(row, dbscan_idx),
            })
        })
        .collect()
}

/// The point of series `group` closest to `(x, y)`.
fn nearest<'a>(points: &'a [MapPoint], group: &str, x: f64, y: f64) -> Option<&'a MapPoint> {
    points
        .iter()
        .filter(|p| p.group == group)
        .min_by(|a, b| {
            let da = (a.lon - x).powi(2) + (a.lat - y).powi(2);
            let db = (b.lon - x).powi(2) + (b.lat - y).powi(2);
            da.total_cmp(&db)
        })
}

fn hover_text(points: &[MapPoint], name: &str, x: f64, y: f64) -> String {
    let mut text = String::new();
    if let Some(p) = nearest(points, name, x, y) {
        if let Some(c) = &p.cluster {
            text.push_str(&format!("{CLUSTER_COLUMN}: {c}\n"));
        }
        if let Some(d) = &p.dbscan {
            text.push_str(&format!("{DBSCAN_COLUMN}: {d}\n"));
        }
    }
    text.push_str(&format!("latitude: {y:.4}\nlongitude: {x:.4}"));
    text
}

/// Scatter of the filtered rows, one series per label of the grouping column.
pub fn quake_map(ui: &mut Ui, state: &Session, config: &ViewerConfig) {
    let points = Arc::new(map_points(state));

    let mut groups: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for p in points.iter() {
        groups.entry(&p.group).or_default().push([p.lon, p.lat]);
    }

    let hover_points = Arc::clone(&points);
    Plot::new("quake_map")
        .height(config.map_height)
        .legend(Legend::default())
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(move |name, value| hover_text(&hover_points, name, value.x, value.y))
        .show(ui, |plot_ui| {
            for (label, coords) in groups {
                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(label))
                    .unwrap_or(Color32::LIGHT_BLUE);
                plot_ui.points(
                    Points::new(PlotPoints::from(coords))
                        .radius(config.map_point_radius)
                        .color(color)
                        .name(label),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Frequency bar charts
// ---------------------------------------------------------------------------

/// Bar chart of per-label counts for `column`, or a warning if the column
/// is absent.
pub fn frequency_chart(
    ui: &mut Ui,
    state: &Session,
    column: &str,
    title: &str,
    config: &ViewerConfig,
) {
    let Some(counts) = state.frequency(column) else {
        ui.colored_label(Color32::YELLOW, format!("Column '{column}' not found."));
        return;
    };
    ui.strong(title);

    let colors = state.color_map.as_ref().filter(|cm| cm.column == column);
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, (label, count))| {
            let bar = Bar::new(i as f64, *count as f64).name(label).width(0.6);
            match colors {
                Some(cm) => bar.fill(cm.color_for(label)),
                None => bar,
            }
        })
        .collect();

    let labels: Vec<String> = counts.into_iter().map(|(label, _)| label).collect();
    Plot::new(format!("freq_{column}"))
        .height(config.bar_chart_height)
        .x_axis_label(column.to_string())
        .y_axis_label("Count")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if idx < 0.0 || (mark.value - idx).abs() > 1e-6 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(title));
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::Selection;

    fn session() -> Session {
        let mut s = Session::default();
        s.load_bytes(
            "quakes.csv",
            b"latitude,longitude,cluster,dbscan_cluster\n\
              1.0,2.0,0,\n\
              3.0,4.0,1,0\n\
              abc,5.0,1,0\n",
        );
        s
    }

    #[test]
    fn points_carry_both_labels_and_skip_bad_coordinates() {
        let points = map_points(&session());
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].group, "N/A");
        assert_eq!(points[0].cluster.as_deref(), Some("0"));
        assert_eq!(points[1].dbscan.as_deref(), Some("0"));
    }

    #[test]
    fn points_follow_the_filter() {
        let mut s = session();
        s.set_cluster_selection(Selection::Value("0".into()));
        let points = map_points(&s);
        assert_eq!(points.len(), 1);
        assert_eq!((points[0].lon, points[0].lat), (2.0, 1.0));
    }

    #[test]
    fn hover_shows_both_labels_of_nearest_point() {
        let points = map_points(&session());
        let text = hover_text(&points, "0", 4.0, 3.0);
        assert_eq!(
            text,
            "cluster: 1\ndbscan_cluster: 0\nlatitude: 3.0000\nlongitude: 4.0000"
        );
    }

    #[test]
    fn hover_off_series_shows_coordinates_only() {
        let points = map_points(&session());
        assert_eq!(
            hover_text(&points, "", 1.23456, -7.5),
            "latitude: -7.5000\nlongitude: 1.2346"
        );
    }

    #[test]
    fn ungrouped_table_uses_single_series() {
        let mut s = Session::default();
        s.load_bytes("plain.csv", b"latitude,longitude\n1,2\n");
        let points = map_points(&s);
        assert_eq!(points[0].group, UNGROUPED);
        assert_eq!(points[0].cluster, None);
    }
}
