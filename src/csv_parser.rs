//! CSV loading with type inference, and CSV export.
//!
//! Reading goes through the [`csv`] crate; each column's type is inferred
//! from its non-missing fields in the order Numeric → Boolean →
//! Categorical → Text. Only `true`/`false` literals count as booleans, so
//! survey-style `Yes`/`No` answers keep their labels.
//!
//! # Example
//!
//! ```
//! use u_eda::csv_parser::CsvParser;
//! use u_eda::dataframe::DataType;
//!
//! let csv = "name,hours,smoker\nAna,7.5,No\nBen,6.0,Yes\nCy,NA,No\n";
//! let df = CsvParser::new().parse_str(csv).unwrap();
//! assert_eq!(df.row_count(), 3);
//! assert_eq!(df.column(1).unwrap().data_type(), DataType::Numeric);
//! assert_eq!(df.column(1).unwrap().null_count(), 1);
//! assert!(df.column(2).unwrap().data_type().is_string_like());
//! ```

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;

use crate::dataframe::{Column, DataFrame, DataType, ValidityBitmap};
use crate::error::EdaError;

/// Fields read as missing values.
const DEFAULT_NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "na", "n/a", "null", "NULL", "None", "none", "NaN", "nan", "NAN", "#N/A",
];

/// Unique-value ratio below which a string column is dictionary-encoded.
const CATEGORICAL_THRESHOLD: f64 = 0.5;

/// Maximum dictionary size for categorical columns.
const MAX_CATEGORICAL_UNIQUE: usize = 1000;

/// CSV parser configuration and entry point.
#[derive(Debug, Clone)]
pub struct CsvParser {
    delimiter: u8,
    has_header: bool,
    null_markers: Vec<String>,
}

impl CsvParser {
    /// Creates a parser with a comma delimiter, a header row and the
    /// standard null markers.
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            null_markers: DEFAULT_NULL_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Sets the field delimiter (default: comma).
    pub fn delimiter(mut self, delim: u8) -> Self {
        self.delimiter = delim;
        self
    }

    /// Sets whether the first row is a header (default: true).
    pub fn has_header(mut self, header: bool) -> Self {
        self.has_header = header;
        self
    }

    /// Replaces the null markers.
    pub fn null_markers(mut self, markers: Vec<String>) -> Self {
        self.null_markers = markers;
        self
    }

    /// Parses CSV text into a DataFrame.
    pub fn parse_str(&self, input: &str) -> Result<DataFrame, EdaError> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        self.parse_reader(input.as_bytes())
    }

    /// Reads a CSV file from disk into a DataFrame.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<DataFrame, EdaError> {
        let content = std::fs::read_to_string(path)?;
        self.parse_str(&content)
    }

    /// Parses CSV from any reader into a DataFrame.
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<DataFrame, EdaError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_header)
            .from_reader(reader);

        let mut rows: Vec<csv::StringRecord> = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            rows.push(record);
        }

        let headers: Vec<String> = if self.has_header {
            reader.headers()?.iter().map(|h| h.to_string()).collect()
        } else {
            let width = rows.first().map_or(0, |r| r.len());
            (0..width).map(|i| format!("col_{i}")).collect()
        };

        if rows.is_empty() {
            return Ok(DataFrame::new());
        }

        let mut df = DataFrame::new();
        for (col_idx, name) in headers.iter().enumerate() {
            let fields: Vec<&str> = rows.iter().map(|r| r.get(col_idx).unwrap_or("")).collect();
            df.add_column(name.clone(), self.build_column(&fields))?;
        }
        Ok(df)
    }

    fn is_null(&self, value: &str) -> bool {
        self.null_markers.iter().any(|m| m == value)
    }

    fn build_column(&self, raw: &[&str]) -> Column {
        let fields: Vec<Option<&str>> = raw
            .iter()
            .map(|s| s.trim())
            .map(|s| if self.is_null(s) { None } else { Some(s) })
            .collect();

        match infer_type(&fields) {
            DataType::Numeric => Column::from_options(
                fields
                    .iter()
                    .map(|f| f.and_then(|s| s.parse::<f64>().ok()))
                    .collect(),
            ),
            DataType::Boolean => Column::boolean(
                fields
                    .iter()
                    .map(|f| f.is_some_and(|s| s.eq_ignore_ascii_case("true")))
                    .collect(),
                ValidityBitmap::from_flags(fields.iter().map(Option::is_some)),
            ),
            DataType::Categorical => {
                Column::from_strings(fields.iter().map(|f| f.map(str::to_string)).collect())
            }
            DataType::Text => Column::text(
                fields
                    .iter()
                    .map(|f| f.unwrap_or_default().to_string())
                    .collect(),
                ValidityBitmap::from_flags(fields.iter().map(Option::is_some)),
            ),
        }
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Most specific type that fits every present field. All-missing columns
/// are numeric.
fn infer_type(fields: &[Option<&str>]) -> DataType {
    let present: Vec<&str> = fields.iter().flatten().copied().collect();

    if present.iter().all(|s| s.parse::<f64>().is_ok_and(f64::is_finite)) {
        return DataType::Numeric;
    }
    if present
        .iter()
        .all(|s| s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false"))
    {
        return DataType::Boolean;
    }

    let unique: HashSet<&str> = present.iter().copied().collect();
    let ratio = unique.len() as f64 / present.len() as f64;
    if ratio < CATEGORICAL_THRESHOLD && unique.len() <= MAX_CATEGORICAL_UNIQUE {
        DataType::Categorical
    } else {
        DataType::Text
    }
}

// ── Export ────────────────────────────────────────────────────────────

/// Writes a DataFrame as CSV with a header row. Missing values are
/// written as empty fields.
pub fn write_csv<W: Write>(df: &DataFrame, writer: W) -> Result<(), EdaError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(df.column_names())?;
    for row in 0..df.row_count() {
        let record: Vec<String> = df
            .iter()
            .map(|(_, col)| match col {
                Column::Numeric { values, validity } if validity.is_valid(row) => {
                    values[row].to_string()
                }
                _ => col.value_string(row).unwrap_or_default(),
            })
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a DataFrame to a CSV file.
pub fn write_csv_file<P: AsRef<Path>>(df: &DataFrame, path: P) -> Result<(), EdaError> {
    let file = std::fs::File::create(path)?;
    write_csv(df, std::io::BufWriter::new(file))
}

// ── Tests ─────────────────────────────────────────────────────────────
