use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a file or sheet could not be turned into a [`Table`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("The file {file} does not exist in the data directory.")]
    MissingFile { file: String },

    #[error("The sheet '{sheet}' does not exist in {file}.")]
    MissingSheet { file: String, sheet: String },

    #[error("An error occurred while loading {file}: {message}")]
    Parse { file: String, message: String },
}

impl LoadError {
    /// True for the "nothing there" class (file or sheet absent).
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            LoadError::MissingFile { .. } | LoadError::MissingSheet { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load one table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – workbook; `sheet` picks the sheet
///   (first sheet when `None`), first row is the header
/// * `.csv`     – header row plus records
/// * `.parquet` – scalar columns only
/// * `.json`    – `[{ "col": value, ... }, ...]`
///
/// `sheet` is ignored (with a warning) for single-table formats.
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<Table, LoadError> {
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if !path.exists() {
        return Err(LoadError::MissingFile { file });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if sheet.is_some() && !is_workbook_ext(&ext) {
        log::warn!("{file}: sheet name ignored for .{ext} files");
    }

    let result = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => load_workbook(path, sheet),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => Err(anyhow::anyhow!("Unsupported file extension: .{other}")),
    };

    result.map_err(|e| match e.downcast::<LoadError>() {
        Ok(load_err) => load_err,
        Err(e) => LoadError::Parse {
            file,
            message: format!("{e:#}"),
        },
    })
}

fn is_workbook_ext(ext: &str) -> bool {
    matches!(ext, "xlsx" | "xlsm" | "xls" | "ods")
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

fn load_workbook(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let names = workbook.sheet_names();

    let sheet_name = match sheet {
        Some(s) if names.iter().any(|n| n == s) => s.to_string(),
        Some(s) => {
            return Err(LoadError::MissingSheet {
                file: path
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                sheet: s.to_string(),
            }
            .into())
        }
        None => names.first().cloned().context("workbook has no sheets")?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("reading sheet '{sheet_name}'"))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };
    let columns = header.iter().map(|c| c.to_string().trim().to_string()).collect();
    let mut table = Table::new(columns);

    for row in rows {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        table.push_row(row.iter().map(workbook_cell).collect());
    }

    Ok(table)
}

fn workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        // Excel stores every number as a double; whole numbers behave like integer columns.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => CellValue::Integer(*f as i64),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        other => CellValue::Date(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per row.
/// Cell types are guessed per value.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = Table::new(headers);

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        table.push_row(record.iter().map(guess_cell_type).collect());
    }

    Ok(table)
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
        return CellValue::Bool(s.eq_ignore_ascii_case("true"));
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "BKCaseNo": 1, "CaseType": "Elective", "DurationOfSurgeryMinutes": 42 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut order: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut row = BTreeMap::new();
        for (key, val) in obj {
            if !order.contains(key) {
                order.push(key.clone());
            }
            row.insert(key.clone(), json_to_cell(val));
        }
        rows.push(row);
    }

    Ok(Table::from_records(rows, order))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with scalar columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut table = Table::new(columns);

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row}"))?;
            table.push_row(cells);
        }
    }

    Ok(table)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            CellValue::Date(array_value_to_string(col.as_ref(), row)?)
        }
        DataType::List(_) | DataType::LargeList(_) | DataType::Struct(_) | DataType::Map(_, _) => {
            bail!("nested column type {:?} is not supported", col.data_type())
        }
        _ => CellValue::String(array_value_to_string(col.as_ref(), row)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_keeps_row_count_and_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "cases.csv",
            "BKCaseNo,CaseType,DurationOfSurgeryMinutes,LateStart\n\
             1,Elective,42,TRUE\n\
             2,Emergency,12.5,false\n\
             3,Elective,,0\n",
        );

        let table = load_table(&path, None).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.columns,
            vec!["BKCaseNo", "CaseType", "DurationOfSurgeryMinutes", "LateStart"]
        );
        assert_eq!(table.rows[0][0], CellValue::Integer(1));
        assert_eq!(table.rows[1][2], CellValue::Float(12.5));
        assert_eq!(table.rows[0][3], CellValue::Bool(true));
        assert!(table.rows[2][2].is_null());
    }

    #[test]
    fn currency_text_stays_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "inc.csv", "Procedure_Name,Income\nA,\"£1,234.00\"\n");
        let table = load_table(&path, None).unwrap();
        assert_eq!(table.rows[0][1], CellValue::String("£1,234.00".into()));
    }

    #[test]
    fn json_records_become_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "cases.json",
            r#"[{"id": 1, "name": "a", "ok": true}, {"id": 2, "extra": 1.5}]"#,
        );
        let table = load_table(&path, None).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns, vec!["id", "name", "ok", "extra"]);
        assert!(table.rows[1][1].is_null());
        assert_eq!(table.rows[1][3], CellValue::Float(1.5));
    }

    #[test]
    fn missing_file_is_reported_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(&dir.path().join("nope.csv"), None).unwrap_err();
        assert_eq!(
            err,
            LoadError::MissingFile {
                file: "nope.csv".into()
            }
        );
        assert!(err.is_missing());
    }

    #[test]
    fn malformed_json_is_a_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "bad.json", "{ not json");
        let err = load_table(&path, None).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(!err.is_missing());
    }

    #[test]
    fn ragged_csv_is_a_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "ragged.csv", "a,b\n1,2\n3,4,5\n");
        let err = load_table(&path, None).unwrap_err();
        match err {
            LoadError::Parse { file, message } => {
                assert_eq!(file, "ragged.csv");
                assert!(message.contains("CSV row 1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unsupported_extension_is_a_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "notes.txt", "hello");
        let err = load_table(&path, None).unwrap_err();
        match err {
            LoadError::Parse { message, .. } => assert!(message.contains(".txt")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parquet_scalar_columns_load() {
        use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("BKCaseNo", DataType::Int64, false),
            Field::new("ProcedureName", DataType::Utf8, true),
            Field::new("DurationOfSurgeryMinutes", DataType::Float64, true),
            Field::new("LateStart", DataType::Boolean, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(StringArray::from(vec![Some("Cataract"), None])),
                Arc::new(Float64Array::from(vec![Some(30.0), None])),
                Arc::new(BooleanArray::from(vec![true, false])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_table(&path, Some("ignored")).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns.len(), 4);
        assert_eq!(table.rows[0][1], CellValue::String("Cataract".into()));
        assert!(table.rows[1][1].is_null());
        assert!(table.rows[1][2].is_null());
        assert_eq!(table.rows[0][3], CellValue::Bool(true));
    }

    #[test]
    fn workbook_sheets_load_by_name() {
        use rust_xlsxwriter::Workbook;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wb.xlsx");

        let mut wb = Workbook::new();
        let raw = wb.add_worksheet();
        raw.set_name("Raw Data").unwrap();
        raw.write_string(0, 0, "BKCaseNo").unwrap();
        raw.write_string(0, 1, "DurationOfSurgeryMinutes").unwrap();
        raw.write_number(1, 0, 1001).unwrap();
        raw.write_number(1, 1, 12.5).unwrap();
        raw.write_number(2, 0, 1002).unwrap();
        let income = wb.add_worksheet();
        income.set_name("Ophthalmology Income").unwrap();
        income.write_string(0, 0, "Procedure_Name").unwrap();
        income.write_string(0, 1, "Income").unwrap();
        income.write_string(1, 0, "Cataract").unwrap();
        income.write_string(1, 1, "£1,000.00").unwrap();
        wb.save(&path).unwrap();

        let raw = load_table(&path, Some("Raw Data")).unwrap();
        assert_eq!(raw.columns, vec!["BKCaseNo", "DurationOfSurgeryMinutes"]);
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.rows[0][0], CellValue::Integer(1001));
        assert_eq!(raw.rows[0][1], CellValue::Float(12.5));
        assert!(raw.rows[1][1].is_null());

        let income = load_table(&path, Some("Ophthalmology Income")).unwrap();
        assert_eq!(income.columns, vec!["Procedure_Name", "Income"]);
        assert_eq!(income.len(), 1);
        assert_eq!(income.rows[0][1], CellValue::String("£1,000.00".into()));

        // No sheet named: the first one.
        assert_eq!(load_table(&path, None).unwrap(), raw);

        let err = load_table(&path, Some("Nope")).unwrap_err();
        assert_eq!(
            err,
            LoadError::MissingSheet {
                file: "wb.xlsx".into(),
                sheet: "Nope".into()
            }
        );
        assert!(err.is_missing());
    }
}
