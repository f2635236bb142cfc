//! Z-score standardization of selected numeric columns.

use std::io::Write;

use crate::dataframe::{Column, DataFrame};
use crate::error::EdaError;

/// Columns standardized when none are configured.
pub const DEFAULT_STANDARDIZE_COLUMNS: [&str; 2] =
    ["Avg_Daily_Usage_Hours", "Sleep_Hours_Per_Night"];

/// Options for [`standardize_numeric_columns`].
#[derive(Debug, Clone)]
pub struct StandardizeConfig {
    /// Columns to rescale.
    pub columns: Vec<String>,
    /// Print the standardized column list to stdout.
    pub verbose: bool,
}

impl Default for StandardizeConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_STANDARDIZE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            verbose: true,
        }
    }
}

/// Returns a copy of `df` in which every configured column is rescaled to
/// `(x - mean) / std`.
///
/// `std` is the population standard deviation of the present values.
/// Missing values stay missing; a constant column becomes all zeros.
///
/// # Errors
///
/// - [`EdaError::ColumnNotFound`] for an unknown column
/// - [`EdaError::NonNumericColumn`] for a column not stored as numbers
///
/// ```
/// use u_eda::csv_parser::CsvParser;
/// use u_eda::standardize::{standardize_numeric_columns, StandardizeConfig};
///
/// let df = CsvParser::new().parse_str("h\n1\n2\n3\n").unwrap();
/// let config = StandardizeConfig {
///     columns: vec!["h".into()],
///     verbose: false,
/// };
/// let out = standardize_numeric_columns(&df, &config).unwrap();
///
/// let z = out.column_by_name("h").unwrap().valid_numeric_values().unwrap();
/// assert!((z[0] + 1.224_744_871).abs() < 1e-9);
/// assert_eq!(z[1], 0.0);
/// ```
pub fn standardize_numeric_columns(
    df: &DataFrame,
    config: &StandardizeConfig,
) -> Result<DataFrame, EdaError> {
    let mut out = df.clone();

    for name in &config.columns {
        let col = df
            .column_by_name(name)
            .ok_or_else(|| EdaError::ColumnNotFound { name: name.clone() })?;
        let Column::Numeric { values, validity } = col else {
            return Err(EdaError::NonNumericColumn { column: name.clone() });
        };

        let present: Vec<f64> = validity.valid_indices().map(|i| values[i]).collect();
        let (mean, std) = population_moments(&present);
        let scale = if std > 0.0 { std } else { 1.0 };
        log::debug!("'{name}': mean {mean:.4}, std {std:.4}");

        let scaled = values
            .iter()
            .enumerate()
            .map(|(i, &v)| if validity.is_valid(i) { (v - mean) / scale } else { 0.0 })
            .collect();
        out.replace_column(name, Column::numeric(scaled, validity.clone()))?;
    }

    log::info!("standardized columns: {:?}", config.columns);
    if config.verbose {
        writeln!(std::io::stdout().lock(), "Standardized columns: {:?}", config.columns)?;
    }
    Ok(out)
}

/// Mean and population (ddof = 0) standard deviation; zeros when empty.
fn population_moments(values: &[f64]) -> (f64, f64) {
    let Some(mean) = u_numflow::stats::mean(values) else {
        return (0.0, 0.0);
    };
    let n = values.len() as f64;
    let var = u_numflow::stats::variance(values).map_or(0.0, |v| v * (n - 1.0) / n);
    (mean, var.sqrt())
}
