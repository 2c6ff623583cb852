use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value as JsonValue};

use super::filter::FilteredView;
use super::model::RecordTable;

enum ExportFormat {
    Csv,
    Json,
}

/// Write the filtered rows to a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row plus the visible rows, missing cells left empty
/// * `.json` – `[{ "latitude": ..., "cluster": "2", ... }, ...]`
pub fn export_file(table: &RecordTable, view: &FilteredView, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let format = match ext.as_str() {
        "csv" => ExportFormat::Csv,
        "json" => ExportFormat::Json,
        other => bail!("Unsupported export extension: .{other}"),
    };

    // Rows go to a sibling temp file first; `path` only appears once complete.
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    {
        let mut writer = std::io::BufWriter::new(tmp.as_file_mut());
        match format {
            ExportFormat::Csv => write_csv(table, view, &mut writer)?,
            ExportFormat::Json => write_json(table, view, &mut writer)?,
        }
        writer.flush().context("flushing export")?;
    }
    tmp.persist(path)
        .with_context(|| format!("writing {}", path.display()))?;

    log::info!("Exported {} rows to {}", view.len(), path.display());
    Ok(())
}

pub fn write_csv<W: Write>(table: &RecordTable, view: &FilteredView, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&table.columns).context("writing CSV header")?;
    for row in view.rows(table) {
        out.write_record(row.iter().map(|c| c.to_string()))
            .context("writing CSV row")?;
    }
    out.flush().context("flushing CSV")?;
    Ok(())
}

/// Records-oriented JSON, one object per visible row.
pub fn write_json<W: Write>(table: &RecordTable, view: &FilteredView, writer: W) -> Result<()> {
    let records: Vec<JsonValue> = view
        .rows(table)
        .map(|row| -> serde_json::Result<JsonValue> {
            let mut obj = Map::with_capacity(table.columns.len());
            for (col, cell) in table.columns.iter().zip(row) {
                obj.insert(col.clone(), serde_json::to_value(cell)?);
            }
            Ok(JsonValue::Object(obj))
        })
        .collect::<serde_json::Result<Vec<_>>>()
        .context("converting rows to JSON")?;

    serde_json::to_writer_pretty(writer, &records).context("writing JSON")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{LabelFilters, Selection, filter};
    use crate::data::loader::load_bytes;

    fn table() -> RecordTable {
        load_bytes(
            b"latitude,longitude,cluster,dbscan_cluster,place\n1.5,2,0,,Aceh\n3,4,1,0,\n",
        )
        .unwrap()
    }

    #[test]
    fn csv_contains_only_visible_rows() {
        let table = table();
        let view = filter(
            &table,
            &LabelFilters {
                cluster: Selection::Value("1".into()),
                dbscan: Selection::All,
            },
        );
        let mut buf = Vec::new();
        write_csv(&table, &view, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "latitude,longitude,cluster,dbscan_cluster,place\n3,4,1,0,\n"
        );
    }

    #[test]
    fn json_records_keep_scalar_types() {
        let table = table();
        let mut buf = Vec::new();
        write_json(&table, &FilteredView::all(&table), &mut buf).unwrap();
        let parsed: JsonValue = serde_json::from_slice(&buf).unwrap();
        let rows = parsed.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["latitude"], serde_json::json!(1.5));
        assert_eq!(rows[0]["longitude"], serde_json::json!(2));
        assert_eq!(rows[0]["dbscan_cluster"], serde_json::json!("N/A"));
        assert_eq!(rows[1]["place"], JsonValue::Null);
    }

    #[test]
    fn export_file_dispatches_on_extension() {
        let table = table();
        let view = FilteredView::all(&table);
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("out.csv");
        export_file(&table, &view, &csv_path).unwrap();
        let reloaded = load_bytes(&std::fs::read(&csv_path).unwrap()).unwrap();
        assert_eq!(reloaded, table);
        // no temp file left next to the export
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn unsupported_extension_leaves_no_file() {
        let table = table();
        let view = FilteredView::all(&table);
        let dir = tempfile::tempdir().unwrap();
        let rejected = dir.path().join("out.xlsx");

        let err = export_file(&table, &view, &rejected).unwrap_err();
        assert!(err.to_string().contains(".xlsx"), "{err}");
        assert!(!rejected.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
