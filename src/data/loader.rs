use std::fmt;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{Field, Record, Table};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What to do with a row whose cells do not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum InvalidRowPolicy {
    /// Abort the load on the first malformed row.
    #[default]
    Reject,
    /// Drop the row and keep going.
    Skip,
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter for delimited text. `.tsv` files always use a tab.
    pub delimiter: u8,
    pub invalid_rows: InvalidRowPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            invalid_rows: InvalidRowPolicy::Reject,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a campaign table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` / `.tsv` – header row followed by one record per line
/// * `.json`    – `[{ "Platform": "...", "Week": 1, ... }, ...]`
/// * `.parquet` – flat schema with one column per field
///
/// Rows are numbered from 1 in error messages, header excluded.
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Table, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" | "txt" => load_csv(path, options.delimiter, options)?,
        "tsv" => load_csv(path, b'\t', options)?,
        "json" => load_json(path, options)?,
        "parquet" | "pq" => load_parquet(path, options)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    log::info!(
        "Loaded {} records from {} ({} platforms, {} influencers)",
        table.len(),
        path.display(),
        table.platforms().len(),
        table.influencers().len()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Cell – one raw value before it is typed by its field
// ---------------------------------------------------------------------------

/// A raw cell as the source format hands it over.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Null => write!(f, "<null>"),
        }
    }
}

fn invalid(row: usize, column: Field, cell: &Cell) -> LoadError {
    LoadError::InvalidValue {
        row,
        column,
        value: cell.to_string(),
    }
}

fn text(row: usize, field: Field, cell: Cell) -> Result<String, LoadError> {
    match cell {
        Cell::Text(s) => Ok(s),
        Cell::Integer(i) => Ok(i.to_string()),
        Cell::Bool(b) => Ok(b.to_string()),
        Cell::Float(v) if v.is_finite() => Ok(v.to_string()),
        other => Err(invalid(row, field, &other)),
    }
}

fn integer(row: usize, field: Field, cell: Cell) -> Result<i64, LoadError> {
    let parsed = match &cell {
        Cell::Integer(i) => Some(*i),
        // pandas writes integer columns holding NaN as floats ("3.0")
        Cell::Float(v) => whole_number(*v),
        Cell::Text(s) => s
            .parse::<i64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().and_then(whole_number)),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(row, field, &cell))
}

/// `v` as an `i64` when it is integral and representable; `i64::MAX as f64` is 2^63.
fn whole_number(v: f64) -> Option<i64> {
    let in_range = (i64::MIN as f64..i64::MAX as f64).contains(&v);
    (in_range && v.fract() == 0.0).then_some(v as i64)
}

fn float(row: usize, field: Field, cell: Cell) -> Result<f64, LoadError> {
    let parsed = match &cell {
        Cell::Float(v) => Some(*v),
        Cell::Integer(i) => Some(*i as f64),
        Cell::Text(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(row, field, &cell))
}

fn flag(row: usize, field: Field, cell: Cell) -> Result<bool, LoadError> {
    let parsed = match &cell {
        Cell::Bool(b) => Some(*b),
        Cell::Integer(0) => Some(false),
        Cell::Integer(1) => Some(true),
        Cell::Float(v) if *v == 0.0 => Some(false),
        Cell::Float(v) if *v == 1.0 => Some(true),
        Cell::Text(s) => match s.to_ascii_lowercase().as_str() {
            "1" | "1.0" | "true" | "yes" | "y" => Some(true),
            "0" | "0.0" | "false" | "no" | "n" => Some(false),
            _ => None,
        },
        _ => None,
    };
    parsed.ok_or_else(|| invalid(row, field, &cell))
}

/// Assemble a typed record; `cell` yields the raw value of each field.
fn build_record(
    row: usize,
    mut cell: impl FnMut(Field) -> Result<Cell, LoadError>,
) -> Result<Record, LoadError> {
    let mut text_of = |f: Field| -> Result<String, LoadError> { text(row, f, cell(f)?) };
    let platform = text_of(Field::Platform)?;
    let influencer_name = text_of(Field::InfluencerName)?;
    let safety_bucket = text_of(Field::SafetyBucket)?;
    let would_rehire = text_of(Field::WouldRehire)?;

    let mut int_of = |f: Field| -> Result<i64, LoadError> { integer(row, f, cell(f)?) };
    let week = int_of(Field::Week)?;
    let impressions = int_of(Field::Impressions)?;
    let clicks = int_of(Field::Clicks)?;
    let conversions = int_of(Field::Conversions)?;

    let mut float_of = |f: Field| -> Result<f64, LoadError> { float(row, f, cell(f)?) };
    let adcred_score = float_of(Field::AdCredScore)?;
    let roi = float_of(Field::Roi)?;
    let revenue = float_of(Field::Revenue)?;
    let cart_value_usd = float_of(Field::CartValueUsd)?;
    let sentiment_score = float_of(Field::SentimentScore)?;
    let fake_follower_pct = float_of(Field::FakeFollowerPct)?;
    let brand_safety_rating = float_of(Field::BrandSafetyRating)?;
    let content_match_score = float_of(Field::ContentMatchScore)?;
    let posting_frequency = float_of(Field::PostingFrequency)?;
    let story_view_rate_pct = float_of(Field::StoryViewRatePct)?;

    let mut flag_of = |f: Field| -> Result<bool, LoadError> { flag(row, f, cell(f)?) };
    let clicked = flag_of(Field::Clicked)?;
    let visited_landing = flag_of(Field::VisitedLanding)?;
    let downloaded_offer = flag_of(Field::DownloadedOffer)?;
    let purchased = flag_of(Field::Purchased)?;

    Ok(Record {
        platform,
        influencer_name,
        week,
        adcred_score,
        roi,
        revenue,
        impressions,
        clicks,
        safety_bucket,
        cart_value_usd,
        sentiment_score,
        fake_follower_pct,
        brand_safety_rating,
        content_match_score,
        posting_frequency,
        story_view_rate_pct,
        would_rehire,
        clicked,
        visited_landing,
        downloaded_offer,
        purchased,
        conversions,
    })
}

// ---------------------------------------------------------------------------
// RowSink – applies the malformed-row policy
// ---------------------------------------------------------------------------

struct RowSink {
    policy: InvalidRowPolicy,
    records: Vec<Record>,
    skipped: usize,
}

impl RowSink {
    fn new(policy: InvalidRowPolicy) -> Self {
        Self {
            policy,
            records: Vec::new(),
            skipped: 0,
        }
    }

    fn push(&mut self, result: Result<Record, LoadError>) -> Result<(), LoadError> {
        match result {
            Ok(record) => self.records.push(record),
            Err(e) if e.is_row_level() && self.policy == InvalidRowPolicy::Skip => {
                log::warn!("Skipping malformed row: {e}");
                self.skipped += 1;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn finish(self) -> Table {
        if self.skipped > 0 {
            log::info!("Skipped {} malformed rows", self.skipped);
        }
        Table::from_records(self.records)
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with the column names of [`Field`]; extra columns are ignored.
fn load_csv(path: &Path, delimiter: u8, options: &LoadOptions) -> Result<Table, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let mut index = [0usize; Field::ALL.len()];
    for (slot, field) in index.iter_mut().zip(Field::ALL) {
        *slot = headers
            .iter()
            .position(|h| h == field.name())
            .ok_or(LoadError::MissingColumn(field))?;
    }
    let column_of = |field: Field| index[field as usize];

    let mut sink = RowSink::new(options.invalid_rows);
    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let parsed = match result {
            Ok(record) => build_record(row, |field| {
                Ok(match record.get(column_of(field)) {
                    Some("") | None => Cell::Null,
                    Some(s) => Cell::Text(s.to_string()),
                })
            }),
            Err(e)
                if matches!(
                    e.kind(),
                    csv::ErrorKind::UnequalLengths { .. } | csv::ErrorKind::Utf8 { .. }
                ) =>
            {
                Err(LoadError::InvalidRow {
                    row,
                    reason: e.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        sink.push(parsed)?;
    }

    Ok(sink.finish())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "Platform": "Instagram", "Influencer_Name": "Ava", "Week": 1, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path, options: &LoadOptions) -> Result<Table, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected a top-level JSON array".into()))?;

    let mut sink = RowSink::new(options.invalid_rows);
    for (i, value) in rows.iter().enumerate() {
        let row = i + 1;
        let parsed = match value.as_object() {
            Some(obj) => build_record(row, |field| match obj.get(field.name()) {
                Some(v) => Ok(json_to_cell(v)),
                None => Err(LoadError::MissingColumn(field)),
            }),
            None => Err(LoadError::InvalidRow {
                row,
                reason: "not a JSON object".into(),
            }),
        };
        sink.push(parsed)?;
    }

    Ok(sink.finish())
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per [`Field`].
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path, options: &LoadOptions) -> Result<Table, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut sink = RowSink::new(options.invalid_rows);
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        let mut columns: Vec<&ArrayRef> = Vec::with_capacity(Field::ALL.len());
        for field in Field::ALL {
            let idx = schema
                .index_of(field.name())
                .map_err(|_| LoadError::MissingColumn(field))?;
            columns.push(batch.column(idx));
        }

        for i in 0..batch.num_rows() {
            let row = row_offset + i + 1;
            let parsed = build_record(row, |field| extract_cell(columns[field as usize], i, field));
            sink.push(parsed)?;
        }
        row_offset += batch.num_rows();
    }

    Ok(sink.finish())
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize, field: Field) -> Result<Cell, LoadError> {
    if col.is_null(row) {
        return Ok(Cell::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => Cell::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Cell::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => Cell::Integer(i64::from(col.as_primitive::<Int32Type>().value(row))),
        DataType::Int64 => Cell::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => Cell::Float(f64::from(col.as_primitive::<Float32Type>().value(row))),
        DataType::Float64 => Cell::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Cell::Bool(col.as_boolean().value(row)),
        // Anything else (dictionary strings, small ints, ...) goes through its
        // display form and is parsed like CSV text.
        other => {
            log::trace!("Column {field} has Arrow type {other:?}, reading its display form");
            Cell::Text(arrow::util::display::array_value_to_string(col, row)?)
        }
    };
    Ok(cell)
}
