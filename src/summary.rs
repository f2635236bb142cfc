//! Column classification and distribution overview.
//!
//! [`analyze_dataframe`] is the first look at a new dataset: it counts
//! unique and missing values per column, suggests whether each column is
//! categorical or numeric, and optionally draws one figure per class.
//!
//! A column is suggested as **categorical** when its declared type is
//! string-like (boolean, categorical, text) or when its unique-value ratio
//! (`unique / rows`) is below the configured threshold. Everything else is
//! **numeric**. The classification is recomputed on every call.
//!
//! # Example
//!
//! ```
//! use u_eda::csv_parser::CsvParser;
//! use u_eda::summary::{analyze_dataframe, AnalyzeConfig, ColumnKind};
//!
//! let mut csv = String::from("id,score,level\n");
//! for i in 0..80 {
//!     csv.push_str(&format!("{i},{},{}\n", i as f64 * 1.5, i % 2));
//! }
//! let df = CsvParser::new().parse_str(&csv).unwrap();
//!
//! let config = AnalyzeConfig {
//!     exclude_cols: vec!["id".into()],
//!     ..AnalyzeConfig::default()
//! };
//! let analysis = analyze_dataframe(&df, &config).unwrap();
//!
//! assert_eq!(analysis.numeric_cols, vec!["score"]);
//! assert_eq!(analysis.categorical_cols, vec!["level"]); // 2 / 80 < 0.05
//! assert_eq!(analysis.summary[1].suggested, ColumnKind::Categorical);
//! ```

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use tabled::{Table, Tabled};

use crate::dataframe::{Column, DataFrame};
use crate::distribution::{histogram, value_counts};
use crate::error::EdaError;
use crate::plot::{render_grid, Panel, PanelData};

/// Default unique-ratio threshold below which a column is categorical.
pub const DEFAULT_UNIQUE_RATIO_THRESHOLD: f64 = 0.05;

/// Number of bins in numeric distribution histograms.
pub const HISTOGRAM_BINS: usize = 20;

/// File name of the categorical distribution figure.
pub const CATEGORICAL_FIGURE: &str = "categorical_distribution.svg";

/// File name of the numeric distribution figure.
pub const NUMERIC_FIGURE: &str = "numeric_distribution.svg";

/// Suggested analytical role of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    /// Treat as a set of labels.
    Categorical,
    /// Treat as a continuous quantity.
    Numeric,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Categorical => f.write_str("Categorical"),
            Self::Numeric => f.write_str("Numeric"),
        }
    }
}

/// One row of the summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    /// Column name.
    pub name: String,
    /// Distinct present values.
    pub unique_count: usize,
    /// Missing values.
    pub missing_count: usize,
    /// `unique_count / rows`; NaN for an empty table.
    pub unique_ratio: f64,
    /// Suggested role.
    pub suggested: ColumnKind,
}

/// Options for [`analyze_dataframe`].
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// Columns left out of the analysis. Unknown names are ignored.
    pub exclude_cols: Vec<String>,
    /// Unique-ratio threshold. Default: 0.05.
    pub threshold: f64,
    /// Directory for the distribution figures; `None` skips drawing.
    pub plot_dir: Option<PathBuf>,
    /// Print the summary table to stdout.
    pub verbose: bool,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            exclude_cols: Vec::new(),
            threshold: DEFAULT_UNIQUE_RATIO_THRESHOLD,
            plot_dir: None,
            verbose: true,
        }
    }
}

/// Result of [`analyze_dataframe`].
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// One entry per analysed column, in table order.
    pub summary: Vec<ColumnSummary>,
    /// Columns suggested as categorical, in table order.
    pub categorical_cols: Vec<String>,
    /// Columns suggested as numeric, in table order.
    pub numeric_cols: Vec<String>,
    /// Figures written to disk.
    pub plots: Vec<PathBuf>,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Column")]
    name: String,
    #[tabled(rename = "Unique Values")]
    unique: usize,
    #[tabled(rename = "Missing Values")]
    missing: usize,
    #[tabled(rename = "Unique Ratio")]
    ratio: String,
    #[tabled(rename = "Suggested Type")]
    kind: ColumnKind,
}

impl Analysis {
    /// Renders the summary as a text table.
    pub fn summary_table(&self) -> String {
        let rows = self.summary.iter().map(|s| SummaryRow {
            name: s.name.clone(),
            unique: s.unique_count,
            missing: s.missing_count,
            ratio: format!("{:.4}", s.unique_ratio),
            kind: s.suggested,
        });
        Table::new(rows).to_string()
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary_table())
    }
}

/// Classifies a single column.
///
/// ```
/// use u_eda::dataframe::{Column, ValidityBitmap};
/// use u_eda::summary::{classify_column, ColumnKind};
///
/// let col = Column::numeric(vec![1.0, 1.0, 2.0, 2.0], ValidityBitmap::all_valid(4));
/// // 2 unique / 4 rows = 0.5
/// assert_eq!(classify_column("x", &col, 4, 0.05).suggested, ColumnKind::Numeric);
/// assert_eq!(classify_column("x", &col, 4, 0.6).suggested, ColumnKind::Categorical);
/// ```
pub fn classify_column(name: &str, col: &Column, n_rows: usize, threshold: f64) -> ColumnSummary {
    let unique_count = col.distinct_count();
    let unique_ratio = if n_rows == 0 {
        f64::NAN
    } else {
        unique_count as f64 / n_rows as f64
    };

    let suggested = if col.data_type().is_string_like() || unique_ratio < threshold {
        ColumnKind::Categorical
    } else {
        ColumnKind::Numeric
    };

    ColumnSummary {
        name: name.to_string(),
        unique_count,
        missing_count: col.null_count(),
        unique_ratio,
        suggested,
    }
}

/// Builds the per-column summary table, excluding `exclude_cols`.
pub fn summarize<S: AsRef<str>>(
    df: &DataFrame,
    exclude_cols: &[S],
    threshold: f64,
) -> Vec<ColumnSummary> {
    let n_rows = df.row_count();
    df.drop_columns(exclude_cols)
        .iter()
        .map(|(name, col)| classify_column(name, col, n_rows, threshold))
        .collect()
}

/// Summarizes, classifies and (optionally) plots every column.
///
/// When `config.plot_dir` is set, writes [`CATEGORICAL_FIGURE`] (bar
/// charts of value counts) and [`NUMERIC_FIGURE`] (20-bin histograms)
/// into it; a figure is skipped when its class has no columns. With
/// `config.verbose` the summary table is printed before any drawing.
pub fn analyze_dataframe(df: &DataFrame, config: &AnalyzeConfig) -> Result<Analysis, EdaError> {
    let summary = summarize(df, &config.exclude_cols, config.threshold);

    let names_of = |kind: ColumnKind| -> Vec<String> {
        summary
            .iter()
            .filter(|s| s.suggested == kind)
            .map(|s| s.name.clone())
            .collect()
    };
    let categorical_cols = names_of(ColumnKind::Categorical);
    let numeric_cols = names_of(ColumnKind::Numeric);

    log::debug!(
        "classified {} columns: {} categorical, {} numeric",
        summary.len(),
        categorical_cols.len(),
        numeric_cols.len()
    );

    let mut analysis = Analysis {
        summary,
        categorical_cols,
        numeric_cols,
        plots: Vec::new(),
    };
    if config.verbose {
        write!(std::io::stdout().lock(), "{analysis}")?;
    }

    let (categorical_cols, numeric_cols) = (&analysis.categorical_cols, &analysis.numeric_cols);
    let mut plots = Vec::new();
    if let Some(dir) = &config.plot_dir {
        std::fs::create_dir_all(dir)?;

        if !categorical_cols.is_empty() {
            let panels = categorical_panels(df, categorical_cols)?;
            let path = dir.join(CATEGORICAL_FIGURE);
            render_grid(&path, "Categorical Variables Distribution", &panels)?;
            plots.push(path);
        }

        if !numeric_cols.is_empty() {
            let panels = numeric_panels(df, numeric_cols)?;
            let path = dir.join(NUMERIC_FIGURE);
            render_grid(&path, "Numeric Variables Distribution", &panels)?;
            plots.push(path);
        }
    }

    analysis.plots = plots;
    Ok(analysis)
}

fn lookup<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, EdaError> {
    df.column_by_name(name).ok_or_else(|| EdaError::ColumnNotFound {
        name: name.to_string(),
    })
}

fn categorical_panels(df: &DataFrame, names: &[String]) -> Result<Vec<Panel>, EdaError> {
    names
        .iter()
        .map(|name| {
            Ok(Panel {
                title: name.clone(),
                data: PanelData::Bars(value_counts(lookup(df, name)?)),
            })
        })
        .collect()
}

fn numeric_panels(df: &DataFrame, names: &[String]) -> Result<Vec<Panel>, EdaError> {
    names
        .iter()
        .map(|name| {
            let col = lookup(df, name)?;
            let data = match col
                .valid_numeric_values()
                .and_then(|values| histogram(&values, HISTOGRAM_BINS))
            {
                Some(hist) => PanelData::Histogram(hist),
                None => {
                    log::warn!("column '{name}' has no numeric values to plot");
                    PanelData::Empty
                }
            };
            Ok(Panel {
                title: name.clone(),
                data,
            })
        })
        .collect()
}
