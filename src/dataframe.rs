//! Column-major DataFrame for tabular data.
//!
//! The [`DataFrame`] stores named, typed columns of equal length. Missing
//! values are tracked per column in a compact [`ValidityBitmap`], so a
//! missing entry never needs a sentinel value.
//!
//! # Column Types
//!
//! | Type | Storage | Treated by the EDA heuristics as |
//! |------|---------|----------------------------------|
//! | [`Numeric`](Column::Numeric) | `Vec<f64>` + bitmap | numeric (declared type) |
//! | [`Boolean`](Column::Boolean) | `Vec<bool>` + bitmap | string-like |
//! | [`Categorical`](Column::Categorical) | Dictionary + `Vec<u32>` | string-like |
//! | [`Text`](Column::Text) | `Vec<String>` + bitmap | string-like |
//!
//! # Example
//!
//! ```
//! use u_eda::dataframe::{Column, DataFrame, ValidityBitmap};
//!
//! let mut df = DataFrame::new();
//! df.add_column(
//!     "hours".to_string(),
//!     Column::numeric(vec![5.5, 7.0, 6.2], ValidityBitmap::all_valid(3)),
//! ).unwrap();
//! df.add_column(
//!     "gender".to_string(),
//!     Column::from_strings(vec![Some("Male".into()), Some("Female".into()), None]),
//! ).unwrap();
//! assert_eq!(df.row_count(), 3);
//! assert_eq!(df.column_by_name("gender").unwrap().null_count(), 1);
//! ```

use std::collections::{HashMap, HashSet};

use crate::error::EdaError;

// ── ValidityBitmap ────────────────────────────────────────────────────

/// Bit-packed validity bitmap: bit `i` is 1 when row `i` holds a value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidityBitmap {
    bits: Vec<u64>,
    len: usize,
}

impl ValidityBitmap {
    /// Creates a bitmap where all `len` positions are valid.
    pub fn all_valid(len: usize) -> Self {
        let mut bitmap = Self::all_invalid(len);
        for word in bitmap.bits.iter_mut() {
            *word = u64::MAX;
        }
        let trailing = len % 64;
        if let (true, Some(last)) = (trailing != 0, bitmap.bits.last_mut()) {
            *last = (1u64 << trailing) - 1;
        }
        bitmap
    }

    /// Creates a bitmap where all `len` positions are missing.
    pub fn all_invalid(len: usize) -> Self {
        Self {
            bits: vec![0u64; len.div_ceil(64)],
            len,
        }
    }

    /// Creates an empty bitmap with no rows.
    pub fn empty() -> Self {
        Self {
            bits: Vec::new(),
            len: 0,
        }
    }

    /// Builds a bitmap from per-row validity flags.
    pub fn from_flags<I: IntoIterator<Item = bool>>(flags: I) -> Self {
        let mut bitmap = Self::empty();
        for valid in flags {
            bitmap.push(valid);
        }
        bitmap
    }

    /// Returns `true` if the value at `idx` is present.
    #[inline]
    pub fn is_valid(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len, "index {idx} out of bounds (len={})", self.len);
        (self.bits[idx / 64] >> (idx % 64)) & 1 == 1
    }

    /// Marks position `idx` as missing.
    #[inline]
    pub fn set_invalid(&mut self, idx: usize) {
        debug_assert!(idx < self.len, "index {idx} out of bounds (len={})", self.len);
        self.bits[idx / 64] &= !(1u64 << (idx % 64));
    }

    /// Appends a new position.
    pub fn push(&mut self, valid: bool) {
        let idx = self.len;
        self.len += 1;
        if idx / 64 >= self.bits.len() {
            self.bits.push(0);
        }
        if valid {
            self.bits[idx / 64] |= 1u64 << (idx % 64);
        }
    }

    /// Returns the total number of tracked positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the bitmap tracks zero positions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Counts the number of present values.
    pub fn valid_count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Counts the number of missing values.
    pub fn null_count(&self) -> usize {
        self.len - self.valid_count()
    }

    /// Iterates over indices of present values in ascending order.
    pub fn valid_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| self.is_valid(i))
    }

    /// Keeps only the positions where `mask` is true.
    fn filter(&self, mask: &[bool]) -> Self {
        Self::from_flags(
            mask.iter()
                .enumerate()
                .filter(|(_, &keep)| keep)
                .map(|(i, _)| self.is_valid(i)),
        )
    }
}

// ── DataType ──────────────────────────────────────────────────────────

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum DataType {
    /// Continuous or integer numeric values (stored as `f64`).
    Numeric,
    /// Boolean (true/false) values.
    Boolean,
    /// Low-cardinality strings (dictionary-encoded).
    Categorical,
    /// High-cardinality or free-form text.
    Text,
}

impl DataType {
    /// Whether the heuristics treat this type as a declared non-numeric
    /// ("object") type.
    pub fn is_string_like(self) -> bool {
        !matches!(self, Self::Numeric)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Numeric => "Numeric",
            Self::Boolean => "Boolean",
            Self::Categorical => "Categorical",
            Self::Text => "Text",
        };
        f.write_str(name)
    }
}

// ── Column ────────────────────────────────────────────────────────────

/// A typed column with a validity bitmap for missing values.
///
/// Missing positions hold a placeholder (0.0, false, index 0 or an empty
/// string) that is never read.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Dense `f64` values.
    Numeric {
        values: Vec<f64>,
        validity: ValidityBitmap,
    },
    /// Boolean values.
    Boolean {
        values: Vec<bool>,
        validity: ValidityBitmap,
    },
    /// Dictionary-encoded strings; `indices[i]` points into `dictionary`.
    Categorical {
        dictionary: Vec<String>,
        indices: Vec<u32>,
        validity: ValidityBitmap,
    },
    /// Free-form text.
    Text {
        values: Vec<String>,
        validity: ValidityBitmap,
    },
}

impl Column {
    /// Creates a numeric column.
    pub fn numeric(values: Vec<f64>, validity: ValidityBitmap) -> Self {
        Self::Numeric { values, validity }
    }

    /// Creates a numeric column from optional values (`None` = missing).
    pub fn from_options(values: Vec<Option<f64>>) -> Self {
        let validity = ValidityBitmap::from_flags(values.iter().map(Option::is_some));
        let values = values.into_iter().map(|v| v.unwrap_or(0.0)).collect();
        Self::Numeric { values, validity }
    }

    /// Creates a boolean column.
    pub fn boolean(values: Vec<bool>, validity: ValidityBitmap) -> Self {
        Self::Boolean { values, validity }
    }

    /// Creates a categorical column from a dictionary and indices.
    pub fn categorical(
        dictionary: Vec<String>,
        indices: Vec<u32>,
        validity: ValidityBitmap,
    ) -> Self {
        Self::Categorical {
            dictionary,
            indices,
            validity,
        }
    }

    /// Dictionary-encodes optional strings (`None` = missing) in order of
    /// first appearance.
    pub fn from_strings(values: Vec<Option<String>>) -> Self {
        let mut lookup: HashMap<String, u32> = HashMap::new();
        let mut dictionary = Vec::new();
        let mut indices = Vec::with_capacity(values.len());
        let mut validity = ValidityBitmap::empty();

        for value in values {
            match value {
                Some(s) => {
                    let idx = *lookup.entry(s.clone()).or_insert_with(|| {
                        dictionary.push(s);
                        (dictionary.len() - 1) as u32
                    });
                    indices.push(idx);
                    validity.push(true);
                }
                None => {
                    indices.push(0);
                    validity.push(false);
                }
            }
        }

        Self::categorical(dictionary, indices, validity)
    }

    /// Creates a text column.
    pub fn text(values: Vec<String>, validity: ValidityBitmap) -> Self {
        Self::Text { values, validity }
    }

    /// Returns the data type of this column.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Numeric { .. } => DataType::Numeric,
            Self::Boolean { .. } => DataType::Boolean,
            Self::Categorical { .. } => DataType::Categorical,
            Self::Text { .. } => DataType::Text,
        }
    }

    /// Returns the number of rows in this column.
    pub fn len(&self) -> usize {
        self.validity().len()
    }

    /// Returns `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a reference to the validity bitmap.
    pub fn validity(&self) -> &ValidityBitmap {
        match self {
            Self::Numeric { validity, .. }
            | Self::Boolean { validity, .. }
            | Self::Categorical { validity, .. }
            | Self::Text { validity, .. } => validity,
        }
    }

    /// Returns the number of missing values.
    pub fn null_count(&self) -> usize {
        self.validity().null_count()
    }

    /// Returns the number of present values.
    pub fn valid_count(&self) -> usize {
        self.validity().valid_count()
    }

    /// Returns `true` if the value at `idx` is present.
    pub fn is_valid(&self, idx: usize) -> bool {
        self.validity().is_valid(idx)
    }

    /// Returns the numeric value at `idx`, or `None` if missing or not numeric.
    pub fn numeric_at(&self, idx: usize) -> Option<f64> {
        match self {
            Self::Numeric { values, validity } if validity.is_valid(idx) => Some(values[idx]),
            _ => None,
        }
    }

    /// Returns present numeric values (missing excluded).
    pub fn valid_numeric_values(&self) -> Option<Vec<f64>> {
        match self {
            Self::Numeric { values, validity } => {
                Some(validity.valid_indices().map(|i| values[i]).collect())
            }
            _ => None,
        }
    }

    /// Returns the value at `idx` rendered as a string, or `None` if missing.
    ///
    /// Integral numbers render without a fractional part; booleans render
    /// as `True` / `False`.
    pub fn value_string(&self, idx: usize) -> Option<String> {
        if !self.is_valid(idx) {
            return None;
        }
        let s = match self {
            Self::Numeric { values, .. } => format_number(values[idx]),
            Self::Boolean { values, .. } => {
                let s = if values[idx] { "True" } else { "False" };
                s.to_string()
            }
            Self::Categorical {
                dictionary,
                indices,
                ..
            } => dictionary[indices[idx] as usize].clone(),
            Self::Text { values, .. } => values[idx].clone(),
        };
        Some(s)
    }

    /// Number of distinct present values.
    pub fn distinct_count(&self) -> usize {
        let validity = self.validity();
        match self {
            Self::Numeric { values, .. } => validity
                .valid_indices()
                .map(|i| normalized_bits(values[i]))
                .collect::<HashSet<_>>()
                .len(),
            Self::Boolean { values, .. } => validity
                .valid_indices()
                .map(|i| values[i])
                .collect::<HashSet<_>>()
                .len(),
            Self::Categorical {
                dictionary,
                indices,
                ..
            } => validity
                .valid_indices()
                .map(|i| dictionary[indices[i] as usize].as_str())
                .collect::<HashSet<_>>()
                .len(),
            Self::Text { values, .. } => validity
                .valid_indices()
                .map(|i| values[i].as_str())
                .collect::<HashSet<_>>()
                .len(),
        }
    }

    /// Returns a new column holding only the rows where `mask` is true.
    pub fn filter(&self, mask: &[bool]) -> Column {
        fn pick<T: Clone>(values: &[T], mask: &[bool]) -> Vec<T> {
            values
                .iter()
                .zip(mask)
                .filter(|(_, &keep)| keep)
                .map(|(v, _)| v.clone())
                .collect()
        }

        match self {
            Self::Numeric { values, validity } => {
                Self::numeric(pick(values, mask), validity.filter(mask))
            }
            Self::Boolean { values, validity } => {
                Self::boolean(pick(values, mask), validity.filter(mask))
            }
            Self::Categorical {
                dictionary,
                indices,
                validity,
            } => Self::categorical(
                dictionary.clone(),
                pick(indices, mask),
                validity.filter(mask),
            ),
            Self::Text { values, validity } => {
                Self::text(pick(values, mask), validity.filter(mask))
            }
        }
    }
}

/// Renders a number the way a table viewer would: `3` for 3.0, `2.5` for 2.5.
pub(crate) fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Bit pattern used for numeric equality (-0.0 folds into 0.0).
fn normalized_bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

// ── DataFrame ─────────────────────────────────────────────────────────

/// Column-major tabular data structure.
///
/// All columns have the same number of rows. Every transforming method
/// returns a new table and leaves `self` untouched.
#[derive(Debug, Clone, Default)]
pub struct DataFrame {
    names: Vec<String>,
    columns: Vec<Column>,
    row_count: usize,
}

impl DataFrame {
    /// Creates an empty DataFrame with no columns or rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a DataFrame from `(name, column)` pairs.
    pub fn from_columns(columns: Vec<(String, Column)>) -> Result<Self, EdaError> {
        let mut df = Self::new();
        for (name, column) in columns {
            df.add_column(name, column)?;
        }
        Ok(df)
    }

    /// Adds a named column.
    ///
    /// Returns an error if the column length doesn't match the existing
    /// row count (unless this is the first column).
    pub fn add_column(&mut self, name: String, column: Column) -> Result<(), EdaError> {
        let col_len = column.len();
        if self.columns.is_empty() {
            self.row_count = col_len;
        } else if col_len != self.row_count {
            return Err(EdaError::DimensionMismatch {
                expected: self.row_count,
                actual: col_len,
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Swaps the column called `name` for `column`.
    pub fn replace_column(&mut self, name: &str, column: Column) -> Result<(), EdaError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| EdaError::ColumnNotFound {
                name: name.to_string(),
            })?;
        if column.len() != self.row_count {
            return Err(EdaError::DimensionMismatch {
                expected: self.row_count,
                actual: column.len(),
            });
        }
        self.columns[idx] = column;
        Ok(())
    }

    /// Returns the number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the DataFrame has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns column names.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Returns a reference to the column at `index`.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Returns a reference to the column with the given `name`.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    /// Returns the index of the column with the given `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Returns an iterator over (name, column) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(|s| s.as_str()).zip(self.columns.iter())
    }

    /// Returns a summary of column data types.
    pub fn schema(&self) -> Vec<(&str, DataType)> {
        self.iter().map(|(name, col)| (name, col.data_type())).collect()
    }

    /// Returns a copy without the named columns. Unknown names are ignored.
    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S]) -> DataFrame {
        let mut out = DataFrame::new();
        out.row_count = self.row_count;
        for (name, col) in self.iter() {
            if names.iter().any(|n| n.as_ref() == name) {
                continue;
            }
            out.names.push(name.to_string());
            out.columns.push(col.clone());
        }
        out
    }

    /// Returns a copy with every column name passed through `rename`.
    pub fn rename_columns<F: Fn(&str) -> String>(&self, rename: F) -> DataFrame {
        DataFrame {
            names: self.names.iter().map(|n| rename(n)).collect(),
            columns: self.columns.clone(),
            row_count: self.row_count,
        }
    }

    /// Returns a copy holding only the rows where `mask` is true.
    pub fn filter_rows(&self, mask: &[bool]) -> Result<DataFrame, EdaError> {
        if mask.len() != self.row_count {
            return Err(EdaError::DimensionMismatch {
                expected: self.row_count,
                actual: mask.len(),
            });
        }
        Ok(DataFrame {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.filter(mask)).collect(),
            row_count: mask.iter().filter(|&&keep| keep).count(),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
