use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, ArrayRef, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{BattingTable, REQUIRED_COLUMNS, Record};
use crate::error::DataLoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a batting table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with at least the required columns (recommended)
/// * `.json`    – `[{ "season": 2020, "batsman": "...", ... }, ...]`
/// * `.parquet` – flat columns with the required names
pub fn load_file(path: &Path) -> Result<BattingTable, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!("Loaded {} batting records from {}", records.len(), path.display());
    Ok(BattingTable::from_records(records))
}

/// Fail with [`DataLoadError::MissingColumn`] unless every required column is present.
fn check_columns(path: &Path, present: &[&str]) -> Result<(), DataLoadError> {
    for required in REQUIRED_COLUMNS {
        if !present.contains(&required) {
            return Err(DataLoadError::MissingColumn {
                path: path.to_path_buf(),
                column: required.to_string(),
            });
        }
    }
    Ok(())
}

fn parse_error(path: &Path) -> impl FnOnce(anyhow::Error) -> DataLoadError {
    let path = path.to_path_buf();
    move |source| DataLoadError::Parse { path, source }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> DataLoadError {
    let path: PathBuf = path.to_path_buf();
    move |source| DataLoadError::Io { path, source }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Extra columns are ignored; blank stat cells become missing values.
fn load_csv(path: &Path) -> Result<Vec<Record>, DataLoadError> {
    let file = std::fs::File::open(path).map_err(io_error(path))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader
        .headers()
        .context("reading CSV headers")
        .map_err(parse_error(path))?
        .clone();
    check_columns(path, &headers.iter().collect::<Vec<_>>())?;

    read_csv_records(reader).map_err(parse_error(path))
}

fn read_csv_records<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<Record>().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        records.push(record);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "season": 2020, "batsman": "A", "batting_team": "X", "total_runs": 50, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Record>, DataLoadError> {
    let text = std::fs::read_to_string(path).map_err(io_error(path))?;
    let root: JsonValue = serde_json::from_str(&text)
        .context("parsing JSON")
        .map_err(parse_error(path))?;

    let rows = root
        .as_array()
        .context("Expected top-level JSON array")
        .map_err(parse_error(path))?;

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))
            .map_err(parse_error(path))?;
        check_columns(path, &obj.keys().map(String::as_str).collect::<Vec<_>>())?;
    }

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            Record::deserialize(row).with_context(|| format!("Row {i}"))
        })
        .collect::<Result<Vec<_>>>()
        .map_err(parse_error(path))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per required field.
///
/// Integer columns may be Int32 or Int64 (or Float64 when the writer widened
/// them because of nulls); string columns Utf8 or LargeUtf8.
fn load_parquet(path: &Path) -> Result<Vec<Record>, DataLoadError> {
    let file = std::fs::File::open(path).map_err(io_error(path))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")
        .map_err(parse_error(path))?;

    let schema = builder.schema().clone();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    check_columns(path, &names)?;

    let reader = builder
        .build()
        .context("building parquet reader")
        .map_err(parse_error(path))?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result
            .context("reading parquet record batch")
            .map_err(parse_error(path))?;
        records.extend(batch_to_records(&batch).map_err(parse_error(path))?);
    }
    Ok(records)
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .with_context(|| format!("Parquet file missing '{name}' column"))
}

fn batch_to_records(batch: &RecordBatch) -> Result<Vec<Record>> {
    let season = column(batch, "season")?;
    let batsman = column(batch, "batsman")?;
    let team = column(batch, "batting_team")?;
    let runs = column(batch, "total_runs")?;
    let strike_rate = column(batch, "strike_rate")?;
    let fours = column(batch, "fours")?;
    let sixes = column(batch, "sixes")?;
    let balls = column(batch, "balls_faced")?;

    (0..batch.num_rows())
        .map(|row| {
            let year = extract_int(season, row)
                .with_context(|| format!("Row {row}: failed to read 'season'"))?
                .with_context(|| format!("Row {row}: 'season' is null"))?;
            Ok(Record {
                season: i32::try_from(year)
                    .with_context(|| format!("Row {row}: season {year} out of range"))?,
                batsman: extract_string(batsman, row)
                    .with_context(|| format!("Row {row}: failed to read 'batsman'"))?,
                batting_team: extract_string(team, row)
                    .with_context(|| format!("Row {row}: failed to read 'batting_team'"))?,
                total_runs: extract_int(runs, row)
                    .with_context(|| format!("Row {row}: failed to read 'total_runs'"))?,
                strike_rate: extract_float(strike_rate, row)
                    .with_context(|| format!("Row {row}: failed to read 'strike_rate'"))?,
                fours: extract_int(fours, row)
                    .with_context(|| format!("Row {row}: failed to read 'fours'"))?,
                sixes: extract_int(sixes, row)
                    .with_context(|| format!("Row {row}: failed to read 'sixes'"))?,
                balls_faced: extract_int(balls, row)
                    .with_context(|| format!("Row {row}: failed to read 'balls_faced'"))?,
            })
        })
        .collect()
}

// -- Parquet / Arrow helpers --

/// Extract a whole number from an integer (or integral float) column.
fn extract_int(col: &ArrayRef, row: usize) -> Result<Option<i64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Ok(Some(arr.value(row) as i64))
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Ok(Some(arr.value(row)))
        }
        DataType::Float64 | DataType::Float32 => match extract_float(col, row)? {
            None => Ok(None),
            Some(f) if f.fract() == 0.0 => Ok(Some(f as i64)),
            Some(f) => bail!("{f} is not a whole number"),
        },
        other => bail!("Expected an integer column, got {other:?}"),
    }
}

/// Extract a float, treating null and NaN as missing.
fn extract_float(col: &ArrayRef, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Float64 => {
            col.as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?
                .value(row)
        }
        DataType::Float32 => {
            col.as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?
                .value(row) as f64
        }
        DataType::Int32 | DataType::Int64 => {
            return Ok(extract_int(col, row)?.map(|v| v as f64));
        }
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok(Some(value).filter(|v| v.is_finite()))
}

fn extract_string(col: &ArrayRef, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in string column");
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Expected a string column, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::tests::rec;

    const HEADER: &str = "season,batsman,batting_team,total_runs,strike_rate,fours,sixes,balls_faced";

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_csv_in_source_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "ipl.csv",
            &format!("{HEADER}\n2020,A,X,50,125.0,4,2,40\n2021,A,X,30,100.0,2,1,30\n"),
        );

        let table = load_file(&path).unwrap();
        assert_eq!(
            table.records,
            vec![
                rec(2020, "A", "X", 50, 125.0, 4, 2, 40),
                rec(2021, "A", "X", 30, 100.0, 2, 1, 30),
            ]
        );
    }

    #[test]
    fn csv_blank_and_float_cells_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "ipl.csv",
            &format!("{HEADER},extra\n2020,A,X,50.0,,4,,40,ignored\n"),
        );

        let table = load_file(&path).unwrap();
        let row = &table.records[0];
        assert_eq!(row.total_runs, Some(50));
        assert_eq!(row.strike_rate, None);
        assert_eq!(row.sixes, None);
        assert_eq!(row.balls_faced, Some(40));
    }

    #[test]
    fn csv_missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "ipl.csv",
            "season,batsman,batting_team,total_runs,strike_rate,fours,balls_faced\n",
        );

        match load_file(&path) {
            Err(DataLoadError::MissingColumn { column, .. }) => assert_eq!(column, "sixes"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn csv_bad_cell_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "ipl.csv", &format!("{HEADER}\n2020,A,X,lots,1.0,1,1,1\n"));

        assert!(matches!(load_file(&path), Err(DataLoadError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");

        assert!(matches!(load_file(&path), Err(DataLoadError::Io { .. })));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("ipl.xlsx")).unwrap_err();
        assert!(matches!(err, DataLoadError::UnsupportedFormat(ext) if ext == "xlsx"));
    }

    #[test]
    fn loads_json_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "ipl.json",
            r#"[{"season":2020,"batsman":"A","batting_team":"X","total_runs":50,
                "strike_rate":125.0,"fours":4,"sixes":2,"balls_faced":40},
               {"season":2021,"batsman":"A","batting_team":"X","total_runs":30,
                "strike_rate":null,"fours":2,"sixes":1,"balls_faced":30}]"#,
        );

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[1].strike_rate, None);
    }

    #[test]
    fn json_missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "ipl.json", r#"[{"season":2020,"batsman":"A"}]"#);

        assert!(matches!(load_file(&path), Err(DataLoadError::MissingColumn { .. })));
    }

    #[test]
    fn loads_parquet_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipl.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("season", DataType::Int64, false),
            Field::new("batsman", DataType::Utf8, false),
            Field::new("batting_team", DataType::Utf8, false),
            Field::new("total_runs", DataType::Int64, false),
            Field::new("strike_rate", DataType::Float64, true),
            Field::new("fours", DataType::Int64, false),
            Field::new("sixes", DataType::Float64, true),
            Field::new("balls_faced", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![2020, 2021])),
                Arc::new(StringArray::from(vec!["A", "A"])),
                Arc::new(StringArray::from(vec!["X", "X"])),
                Arc::new(Int64Array::from(vec![50, 30])),
                Arc::new(Float64Array::from(vec![Some(125.0), None])),
                Arc::new(Int64Array::from(vec![4, 2])),
                Arc::new(Float64Array::from(vec![Some(2.0), Some(1.0)])),
                Arc::new(Int64Array::from(vec![40, 30])),
            ],
        )
        .unwrap();

        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.records[0], rec(2020, "A", "X", 50, 125.0, 4, 2, 40));
        assert_eq!(table.records[1].strike_rate, None);
        assert_eq!(table.records[1].sixes, Some(1));
    }

    #[test]
    fn parquet_missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipl.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("season", DataType::Int64, false),
            Field::new("batsman", DataType::Utf8, false),
            Field::new("batting_team", DataType::Utf8, false),
            Field::new("total_runs", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![2020])),
                Arc::new(StringArray::from(vec!["A"])),
                Arc::new(StringArray::from(vec!["X"])),
                Arc::new(Int64Array::from(vec![50])),
            ],
        )
        .unwrap();

        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        match load_file(&path) {
            Err(DataLoadError::MissingColumn { column, .. }) => assert_eq!(column, "strike_rate"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn loading_twice_gives_identical_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "ipl.csv",
            &format!("{HEADER}\n2020,A,X,50,125.0,4,2,40\n2020,B,Y,12,80.0,1,0,15\n"),
        );

        assert_eq!(load_file(&path).unwrap(), load_file(&path).unwrap());
    }
}
