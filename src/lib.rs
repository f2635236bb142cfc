//! # u-eda
//!
//! Exploratory data analysis for tabular survey-style data, with C FFI
//! bindings.
//!
//! A first pass over a new dataset usually asks the same questions: which
//! columns are categories and which are measurements, how is each one
//! distributed, where are the outliers, and which pairs of columns are
//! related. u-eda answers them in a few calls and writes the figures as
//! SVG files.
//!
//! ## Modules
//!
//! - [`dataframe`] — Column-major tabular data model (DataFrame, Column, DataType)
//! - [`csv_parser`] — CSV reading with type inference, CSV writing
//! - [`summary`] — Column classification and distribution figures
//! - [`distribution`] — Value counts, histograms, boxplot statistics
//! - [`outliers`] — Boxplots of numeric columns before outlier handling
//! - [`standardize`] — Z-score standardization
//! - [`stat_tests`] — Pairwise chi-squared, t-test and ANOVA with a readable report
//! - [`plot`] — SVG subplot grids (plotters)
//! - [`ffi`] — C FFI bindings (auto-generated C header via cbindgen)
//! - [`error`] — Error types
//!
//! ## Quick Start
//!
//! ```
//! use u_eda::csv_parser::CsvParser;
//! use u_eda::stat_tests::{run_statistical_tests, TestConfig};
//! use u_eda::summary::{analyze_dataframe, AnalyzeConfig};
//!
//! let csv = "hours,sleep,gender\n\
//!            1.0,8.1,M\n2.5,7.5,F\n6.0,5.2,M\n5.5,5.8,F\n\
//!            1.8,7.9,M\n6.3,5.0,F\n2.2,7.7,M\n5.9,5.5,F\n";
//! let df = CsvParser::new().parse_str(csv).unwrap();
//!
//! let analysis = analyze_dataframe(&df, &AnalyzeConfig::default()).unwrap();
//! assert_eq!(analysis.categorical_cols, vec!["gender"]);
//!
//! let config = TestConfig { verbose: false, ..TestConfig::default() };
//! let report = run_statistical_tests(&df, &config).unwrap();
//! assert_eq!(report.results.len(), 2); // hours by gender, sleep by gender
//! ```

pub mod csv_parser;
pub mod dataframe;
pub mod distribution;
pub mod error;
pub mod ffi;
pub mod outliers;
pub mod plot;
pub mod standardize;
pub mod summary;
