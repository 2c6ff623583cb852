use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::model::{CellValue, RecordTable};
use super::{CLUSTER_COLUMN, DBSCAN_COLUMN, NA_MARKER};

/// Integer stand-in for "no cluster assigned" before it is rendered as [`NA_MARKER`].
pub const SENTINEL: i64 = -1;

/// Label columns normalized on load.
pub const LABEL_COLUMNS: [&str; 2] = [CLUSTER_COLUMN, DBSCAN_COLUMN];

/// Cell texts read as missing, in addition to the empty string.
const NA_VALUES: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The uploaded content is not delimited text with a header row.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no columns to parse from file")]
    NoColumns,
    #[error("expected {expected} fields in line {line}, saw {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse file: {0}")]
    Parse(#[from] ParseError),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read a CSV file from disk and load it with [`load_bytes`].
pub fn load_file(path: &Path) -> Result<RecordTable, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(load_bytes(&bytes)?)
}

/// Parse an uploaded byte stream into a [`RecordTable`] and normalize the
/// label columns.
///
/// The first record is the header. Short rows are padded with missing
/// cells; long rows are a parse error. Nothing is returned on failure.
pub fn load_bytes(bytes: &[u8]) -> Result<RecordTable, ParseError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = reader.records();
    let header = match records.next() {
        Some(result) => result?,
        None => return Err(ParseError::NoColumns),
    };
    let columns = dedupe_headers(header.iter().map(|h| h.trim().to_string()));
    if columns.is_empty() {
        return Err(ParseError::NoColumns);
    }

    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        if record.len() == 1 && record[0].is_empty() {
            // blank line
            continue;
        }
        if record.len() > columns.len() {
            return Err(ParseError::FieldCount {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: columns.len(),
                found: record.len(),
            });
        }
        let mut row: Vec<CellValue> = record.iter().map(guess_cell_type).collect();
        row.resize(columns.len(), CellValue::Null);
        rows.push(row);
    }

    let mut table = RecordTable::new(columns, rows);
    for column in LABEL_COLUMNS {
        normalize_label_column(&mut table, column);
    }

    Ok(table)
}

/// Rewrite `column` in place as display labels: missing or non-numeric
/// cells become [`SENTINEL`], every value is truncated to an integer and
/// rendered in decimal, and the sentinel's text is replaced with
/// [`NA_MARKER`].
///
/// Returns `false` (and leaves the table untouched) if the column is absent.
/// Running it twice gives the same result as running it once.
pub fn normalize_label_column(table: &mut RecordTable, column: &str) -> bool {
    let Some(idx) = table.column_index(column) else {
        return false;
    };
    let sentinel_text = SENTINEL.to_string();
    for row in &mut table.rows {
        if let Some(cell) = row.get_mut(idx) {
            let text = label_code(cell).to_string();
            *cell = if text == sentinel_text {
                CellValue::Text(NA_MARKER.to_string())
            } else {
                CellValue::Text(text)
            };
        }
    }
    true
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn label_code(cell: &CellValue) -> i64 {
    match cell {
        CellValue::Integer(i) => *i,
        CellValue::Float(f) if in_label_range(*f) => f.trunc() as i64,
        CellValue::Bool(b) => i64::from(*b),
        CellValue::Text(s) => match guess_cell_type(s) {
            CellValue::Text(_) => SENTINEL,
            other => label_code(&other),
        },
        _ => SENTINEL,
    }
}

/// Finite and representable as `i64` once truncated.
fn in_label_range(f: f64) -> bool {
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    f.is_finite() && f.trunc() >= i64::MIN as f64 && f.trunc() < i64::MAX as f64
}

/// Repeated names get `.1`, `.2`, … suffixes in order of appearance.
fn dedupe_headers(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        let mut candidate = name.clone();
        let mut n = 0;
        while seen.contains(&candidate) {
            n += 1;
            candidate = format!("{name}.{n}");
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

fn guess_cell_type(s: &str) -> CellValue {
    let trimmed = s.trim();
    if trimmed.is_empty() || NA_VALUES.contains(&trimmed) {
        return CellValue::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float(f);
    }
    match trimmed {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::Text(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn labels<'a>(table: &'a RecordTable, column: &str) -> Vec<&'a str> {
        (0..table.len())
            .map(|r| table.label(r, column).unwrap())
            .collect()
    }

    #[test]
    fn scenario_two_rows() {
        let csv = b"latitude,longitude,cluster,dbscan_cluster\n1.0,2.0,0,\n3.0,4.0,1,0\n";
        let table = load_bytes(csv).unwrap();
        assert_eq!(labels(&table, "cluster"), vec!["0", "1"]);
        assert_eq!(labels(&table, "dbscan_cluster"), vec!["N/A", "0"]);
        assert_eq!(table.cell(1, "latitude"), Some(&CellValue::Float(3.0)));
    }

    #[test]
    fn missing_values_become_marker() {
        let csv = b"latitude,longitude,cluster\n0,0,5\n0,0,\n0,0,NaN\n0,0,-1\n0,0,12\n";
        let table = load_bytes(csv).unwrap();
        assert_eq!(labels(&table, "cluster"), vec!["5", "N/A", "N/A", "N/A", "12"]);
        assert!(table
            .column_values("cluster")
            .unwrap()
            .iter()
            .all(|c| !c.is_null()));
    }

    #[test]
    fn float_labels_truncate_and_text_is_missing() {
        let csv = b"cluster\n2.0\n3.7\nnoise\n-4\n";
        let table = load_bytes(csv).unwrap();
        assert_eq!(labels(&table, "cluster"), vec!["2", "3", "N/A", "-4"]);
    }

    #[test]
    fn out_of_range_float_labels_are_missing() {
        let csv = b"cluster\n1e30\n-1e30\ninf\n4e3\n";
        let table = load_bytes(csv).unwrap();
        assert_eq!(labels(&table, "cluster"), vec!["N/A", "N/A", "N/A", "4000"]);
    }

    fn assert_na_token(token: &str) {
        let csv = format!("latitude,longitude,cluster,place\n0,0,{token},{token}\n");
        let table = load_bytes(csv.as_bytes()).unwrap();
        assert_eq!(table.label(0, "cluster"), Some("N/A"), "token {token}");
        assert_eq!(table.cell(0, "place"), Some(&CellValue::Null), "token {token}");
    }

    #[test]
    fn na_token_upper() {
        assert_na_token("NA");
    }

    #[test]
    fn na_token_slash() {
        assert_na_token("N/A");
        assert_na_token("n/a");
    }

    #[test]
    fn na_token_null() {
        assert_na_token("null");
        assert_na_token("NULL");
    }

    #[test]
    fn na_token_none() {
        assert_na_token("None");
    }

    #[test]
    fn na_token_hash_na() {
        assert_na_token("#N/A");
    }

    #[test]
    fn na_token_angle_na() {
        assert_na_token("<NA>");
    }

    #[test]
    fn na_token_nan_variants() {
        assert_na_token("NaN");
        assert_na_token("nan");
        assert_na_token("-NaN");
        assert_na_token("-nan");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let table = load_bytes(b"a,b\n1,2\n\n3,4\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, "a"), Some(&CellValue::Integer(3)));
    }

    #[test]
    fn normalizing_twice_is_a_no_op() {
        let csv = b"cluster,dbscan_cluster\n1,\n,7\n";
        let mut table = load_bytes(csv).unwrap();
        let once = table.clone();
        assert!(normalize_label_column(&mut table, "cluster"));
        assert!(normalize_label_column(&mut table, "dbscan_cluster"));
        assert_eq!(table, once);
    }

    #[test]
    fn absent_label_column_is_skipped() {
        let mut table = load_bytes(b"latitude,longitude\n1,2\n").unwrap();
        assert!(!normalize_label_column(&mut table, "cluster"));
        assert_eq!(table.cell(0, "latitude"), Some(&CellValue::Integer(1)));
    }

    #[test]
    fn other_columns_pass_through() {
        let table = load_bytes(b"place,depth\nJava Sea,10.5\n").unwrap();
        assert_eq!(table.cell(0, "place"), Some(&CellValue::Text("Java Sea".into())));
        assert_eq!(table.cell(0, "depth"), Some(&CellValue::Float(10.5)));
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        assert!(matches!(load_bytes(b""), Err(ParseError::NoColumns)));
    }

    #[test]
    fn long_row_is_a_parse_error() {
        let err = load_bytes(b"a,b\n1,2\n1,2,3\n").unwrap_err();
        match err {
            ParseError::FieldCount {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        assert!(matches!(
            load_bytes(b"a,b\n\xff\xfe,1\n"),
            Err(ParseError::Csv(_))
        ));
    }

    #[test]
    fn short_rows_are_padded() {
        let table = load_bytes(b"latitude,longitude,cluster\n1,2\n").unwrap();
        assert_eq!(table.cell(0, "longitude"), Some(&CellValue::Integer(2)));
        assert_eq!(table.label(0, "cluster"), Some("N/A"));
    }

    #[test]
    fn header_is_trimmed_deduped_and_bom_stripped() {
        let table = load_bytes(b"\xEF\xBB\xBF latitude ,x,x,x\n1,2,3,4\n").unwrap();
        assert_eq!(table.columns, vec!["latitude", "x", "x.1", "x.2"]);
    }

    #[test]
    fn header_only_gives_empty_table() {
        let table = load_bytes(b"latitude,longitude\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 2);
    }

    #[test]
    fn load_file_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "latitude,longitude,cluster").unwrap();
        writeln!(file, "-6.2,106.8,3").unwrap();
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.label(0, "cluster"), Some("3"));
    }

    #[test]
    fn load_file_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
