use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::NA_MARKER;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: cluster label → Color32
// ---------------------------------------------------------------------------

/// Maps the labels of the grouping column to distinct colours.
/// Unassigned points (`N/A`) are always grey.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: String,
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for `column` from its distinct labels.
    pub fn new<'a>(column: &str, labels: impl IntoIterator<Item = &'a str>) -> Self {
        let labels: Vec<&str> = labels.into_iter().filter(|l| *l != NA_MARKER).collect();
        let palette = generate_palette(labels.len());
        let mut mapping: BTreeMap<String, Color32> = labels
            .into_iter()
            .zip(palette)
            .map(|(l, c)| (l.to_string(), c))
            .collect();
        mapping.insert(NA_MARKER.to_string(), Color32::GRAY);

        ColorMap {
            column: column.to_string(),
            mapping,
            default_color: Color32::LIGHT_BLUE,
        }
    }

    /// Look up the colour for a label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Legend entries (label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping.iter().map(|(l, c)| (l.clone(), *c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[2]);
    }

    #[test]
    fn na_is_grey_and_unknown_is_default() {
        let cm = ColorMap::new("dbscan_cluster", ["0", "1", "N/A"]);
        assert_eq!(cm.color_for("N/A"), Color32::GRAY);
        assert_ne!(cm.color_for("0"), cm.color_for("1"));
        assert_eq!(cm.color_for("99"), Color32::LIGHT_BLUE);
        assert_eq!(cm.legend_entries().len(), 3);
    }
}
