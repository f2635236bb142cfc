//! Boxplots for outlier inspection.
//!
//! Before choosing how to treat outliers it helps to see them. This module
//! computes Tukey boxplot statistics for every numeric column and draws
//! them side by side.

use std::path::PathBuf;

use serde::Serialize;

use crate::dataframe::DataFrame;
use crate::distribution::{boxplot_stats, BoxplotStats};
use crate::error::EdaError;
use crate::plot::{render_grid, Panel, PanelData};

/// Title of the boxplot figure.
pub const BOXPLOT_TITLE: &str = "Boxplots Before Outlier Handling";

/// Options for [`plot_boxplots_before_outliers`].
#[derive(Debug, Clone, Default)]
pub struct BoxplotConfig {
    /// SVG file to write; `None` only computes statistics.
    pub output: Option<PathBuf>,
}

/// Boxplot statistics for one column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnBoxplot {
    /// Column name.
    pub name: String,
    /// `None` when the column has no present values.
    pub stats: Option<BoxplotStats>,
}

/// Result of [`plot_boxplots_before_outliers`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct BoxplotReport {
    /// One entry per numeric column, in table order.
    pub columns: Vec<ColumnBoxplot>,
    /// Figure written to disk, if any.
    pub plot: Option<PathBuf>,
}

impl BoxplotReport {
    /// Total number of values drawn beyond the whiskers.
    pub fn outlier_count(&self) -> usize {
        self.columns
            .iter()
            .filter_map(|c| c.stats.as_ref())
            .map(|s| s.outliers.len())
            .sum()
    }
}

/// Computes (and optionally draws) boxplots for all numeric columns not
/// listed in `exclude_cols`. Missing values are dropped per column.
///
/// Only columns stored as numbers take part; low-cardinality numeric
/// columns are included even though the summary heuristics would call
/// them categorical.
///
/// ```
/// use u_eda::csv_parser::CsvParser;
/// use u_eda::outliers::{plot_boxplots_before_outliers, BoxplotConfig};
///
/// let csv = "id,hours,city\n1,2.0,A\n2,2.5,B\n3,3.0,A\n4,2.2,A\n5,30.0,B\n";
/// let df = CsvParser::new().parse_str(csv).unwrap();
/// let report = plot_boxplots_before_outliers(&df, &["id"], &BoxplotConfig::default()).unwrap();
///
/// assert_eq!(report.columns.len(), 1);
/// assert_eq!(report.columns[0].name, "hours");
/// assert_eq!(report.outlier_count(), 1);
/// ```
pub fn plot_boxplots_before_outliers<S: AsRef<str>>(
    df: &DataFrame,
    exclude_cols: &[S],
    config: &BoxplotConfig,
) -> Result<BoxplotReport, EdaError> {
    let columns: Vec<ColumnBoxplot> = df
        .iter()
        .filter(|(name, _)| !exclude_cols.iter().any(|e| e.as_ref() == *name))
        .filter_map(|(name, col)| {
            let values = col.valid_numeric_values()?;
            Some(ColumnBoxplot {
                name: name.to_string(),
                stats: boxplot_stats(&values),
            })
        })
        .collect();

    if columns.is_empty() {
        log::info!("no numeric columns to draw boxplots for");
        return Ok(BoxplotReport::default());
    }

    let plot = match &config.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let panels: Vec<Panel> = columns
                .iter()
                .map(|c| Panel {
                    title: c.name.clone(),
                    data: c
                        .stats
                        .clone()
                        .map_or(PanelData::Empty, PanelData::Boxplot),
                })
                .collect();
            render_grid(path, BOXPLOT_TITLE, &panels)?;
            Some(path.clone())
        }
        None => None,
    };

    Ok(BoxplotReport { columns, plot })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_parser::CsvParser;

    fn sample() -> DataFrame {
        CsvParser::new()
            .parse_str(
                "id,usage,sleep,gender\n\
                 1,2.0,7.0,M\n\
                 2,2.5,NA,F\n\
                 3,3.0,6.5,M\n\
                 4,2.2,7.5,M\n\
                 5,2.8,6.0,F\n\
                 6,2.6,7.0,M\n\
                 7,19.0,6.8,F\n",
            )
            .unwrap()
    }

    #[test]
    fn only_numeric_columns_minus_excluded() {
        let report =
            plot_boxplots_before_outliers(&sample(), &["id"], &BoxplotConfig::default()).unwrap();
        let names: Vec<&str> = report.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["usage", "sleep"]);
        assert!(report.plot.is_none());
    }

    #[test]
    fn missing_values_dropped() {
        let report =
            plot_boxplots_before_outliers(&sample(), &["id"], &BoxplotConfig::default()).unwrap();
        let sleep = report.columns[1].stats.as_ref().unwrap();
        assert_eq!(sleep.count, 6);
    }

    #[test]
    fn extreme_value_is_outlier() {
        let report =
            plot_boxplots_before_outliers(&sample(), &["id"], &BoxplotConfig::default()).unwrap();
        let usage = report.columns[0].stats.as_ref().unwrap();
        assert_eq!(usage.outliers, vec![19.0]);
        assert_eq!(usage.whisker_high, 3.0);
    }

    #[test]
    fn no_numeric_columns_is_empty_report() {
        let df = CsvParser::new().parse_str("g\nM\nF\nM\n").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let config = BoxplotConfig {
            output: Some(dir.path().join("box.svg")),
        };
        let report = plot_boxplots_before_outliers(&df, &[] as &[&str], &config).unwrap();
        assert!(report.columns.is_empty());
        assert!(report.plot.is_none());
        assert!(!dir.path().join("box.svg").exists());
    }

    #[test]
    fn all_missing_column_has_no_stats() {
        let df = CsvParser::new().parse_str("x,y\nNA,1\nNA,2\n").unwrap();
        let report =
            plot_boxplots_before_outliers(&df, &[] as &[&str], &BoxplotConfig::default()).unwrap();
        assert!(report.columns[0].stats.is_none());
        assert!(report.columns[1].stats.is_some());
    }

    #[test]
    fn writes_figure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("box.svg");
        let config = BoxplotConfig {
            output: Some(path.clone()),
        };
        let report = plot_boxplots_before_outliers(&sample(), &["id"], &config).unwrap();
        assert_eq!(report.plot.as_deref(), Some(path.as_path()));
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains(BOXPLOT_TITLE));
    }
}
