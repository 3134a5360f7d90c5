use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, ArrayRef, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use thiserror::Error;

use super::model::{ScoreDataset, ScoreRecord, Subject};

/// Columns every input table must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "state",
    "gender",
    "year",
    "math_score",
    "reading_score",
    "writing_score",
];

/// Input table does not have the expected shape. Rows are 1-based data rows
/// (the CSV header line is not counted).
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("row {row}, column '{column}': {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a score table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the [`REQUIRED_COLUMNS`]
/// * `.parquet` – same column names; `year` integer, scores integer or float
pub fn load_file(path: &Path) -> Result<ScoreDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV {}", path.display()))?;
            load_csv_reader(file)
        }
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    log::info!(
        "Loaded {} records from {}: {} years, {} states, genders {:?}",
        dataset.len(),
        path.display(),
        dataset.years.len(),
        dataset.states.len(),
        dataset.genders
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    state: String,
    gender: String,
    year: i32,
    math_score: f64,
    reading_score: f64,
    writing_score: f64,
}

/// Parse CSV text with a header row. Header names are trimmed and checked
/// for the required columns before any row is read.
pub fn load_csv_reader<R: Read>(input: R) -> Result<ScoreDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(input);
    let headers = reader.headers().context("reading CSV headers")?.clone();

    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            return Err(SchemaError::MissingColumn(col.to_string()).into());
        }
    }

    let mut records = Vec::new();
    for (idx, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row_no = idx + 1;
        // header is line 1
        let row = result.with_context(|| format!("CSV data row {row_no} (line {})", row_no + 1))?;
        let scores = [
            (Subject::Math, row.math_score),
            (Subject::Reading, row.reading_score),
            (Subject::Writing, row.writing_score),
        ];
        for (subject, value) in scores {
            check_score(row_no, subject, value)?;
        }
        records.push(ScoreRecord::new(
            row.state,
            row.gender,
            row.year,
            row.math_score,
            row.reading_score,
            row.writing_score,
        ));
    }

    Ok(ScoreDataset::from_records(records))
}

fn check_score(row: usize, subject: Subject, value: f64) -> Result<(), SchemaError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SchemaError::InvalidValue {
            row,
            column: subject.column().to_string(),
            reason: format!("score {value} is not a finite number"),
        })
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the same named columns as the CSV input.
///
/// String columns may be plain or dictionary encoded (Pandas categoricals).
/// The schema is checked before any batch is read, so a file without rows
/// still fails on missing columns.
fn load_parquet(path: &Path) -> Result<ScoreDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let schema = builder.schema();
    for col in REQUIRED_COLUMNS {
        if schema.index_of(col).is_err() {
            return Err(SchemaError::MissingColumn(col.to_string()).into());
        }
    }

    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        read_batch(&batch, records.len(), &mut records)?;
    }

    Ok(ScoreDataset::from_records(records))
}

fn read_batch(batch: &RecordBatch, row_offset: usize, out: &mut Vec<ScoreRecord>) -> Result<()> {
    let state = string_column(batch, "state")?;
    let gender = string_column(batch, "gender")?;
    let year = column(batch, "year")?;
    let math = column(batch, Subject::Math.column())?;
    let reading = column(batch, Subject::Reading.column())?;
    let writing = column(batch, Subject::Writing.column())?;

    for row in 0..batch.num_rows() {
        let abs_row = row_offset + row + 1;
        let math_score = extract_f64(math, abs_row, row, Subject::Math.column())?;
        let reading_score = extract_f64(reading, abs_row, row, Subject::Reading.column())?;
        let writing_score = extract_f64(writing, abs_row, row, Subject::Writing.column())?;
        check_score(abs_row, Subject::Math, math_score)?;
        check_score(abs_row, Subject::Reading, reading_score)?;
        check_score(abs_row, Subject::Writing, writing_score)?;

        out.push(ScoreRecord::new(
            extract_string(&state, abs_row, row, "state")?,
            extract_string(&gender, abs_row, row, "gender")?,
            extract_year(year, abs_row, row)?,
            math_score,
            reading_score,
            writing_score,
        ));
    }
    Ok(())
}

// -- Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Arc<dyn Array>, SchemaError> {
    batch
        .schema()
        .index_of(name)
        .map(|i| batch.column(i))
        .map_err(|_| SchemaError::MissingColumn(name.to_string()))
}

/// Like [`column`], with dictionary-encoded strings decoded to plain `Utf8`.
fn string_column(batch: &RecordBatch, name: &str) -> Result<ArrayRef> {
    let col = column(batch, name)?;
    match col.data_type() {
        DataType::Dictionary(_, value)
            if matches!(value.as_ref(), DataType::Utf8 | DataType::LargeUtf8) =>
        {
            cast(col, &DataType::Utf8)
                .with_context(|| format!("decoding dictionary column '{name}'"))
        }
        _ => Ok(Arc::clone(col)),
    }
}

fn invalid(row: usize, column: &str, reason: impl Into<String>) -> SchemaError {
    SchemaError::InvalidValue {
        row,
        column: column.to_string(),
        reason: reason.into(),
    }
}

fn extract_string(
    col: &Arc<dyn Array>,
    abs_row: usize,
    row: usize,
    name: &str,
) -> Result<String, SchemaError> {
    if col.is_null(row) {
        return Err(invalid(abs_row, name, "null value"));
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| s.value(row).to_string())
            .ok_or_else(|| invalid(abs_row, name, "expected StringArray")),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => Err(invalid(abs_row, name, format!("expected string, got {other:?}"))),
    }
}

fn extract_year(col: &Arc<dyn Array>, abs_row: usize, row: usize) -> Result<i32, SchemaError> {
    if col.is_null(row) {
        return Err(invalid(abs_row, "year", "null value"));
    }
    match col.data_type() {
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row))
            .ok_or_else(|| invalid(abs_row, "year", "expected Int32Array")),
        DataType::Int64 => {
            let value = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .map(|a| a.value(row))
                .ok_or_else(|| invalid(abs_row, "year", "expected Int64Array"))?;
            i32::try_from(value).map_err(|_| invalid(abs_row, "year", format!("{value} out of range")))
        }
        other => Err(invalid(abs_row, "year", format!("expected integer, got {other:?}"))),
    }
}

fn extract_f64(
    col: &Arc<dyn Array>,
    abs_row: usize,
    row: usize,
    name: &str,
) -> Result<f64, SchemaError> {
    if col.is_null(row) {
        return Err(invalid(abs_row, name, "null value"));
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row)),
        DataType::Float32 => any.downcast_ref::<Float32Array>().map(|a| a.value(row) as f64),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row) as f64),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| a.value(row) as f64),
        other => {
            return Err(invalid(abs_row, name, format!("expected number, got {other:?}")));
        }
    };
    value.ok_or_else(|| invalid(abs_row, name, "unexpected array layout"))
}
