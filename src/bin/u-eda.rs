//! Command-line front end for u-eda.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use u_eda::csv_parser::{write_csv, write_csv_file, CsvParser};
use u_eda::dataframe::DataFrame;
use u_eda::outliers::{plot_boxplots_before_outliers, BoxplotConfig};
use u_eda::standardize::{standardize_numeric_columns, StandardizeConfig};
use u_eda::stat_tests::{run_statistical_tests, TestConfig};
use u_eda::summary::{analyze_dataframe, AnalyzeConfig, DEFAULT_UNIQUE_RATIO_THRESHOLD};

#[derive(Parser)]
#[command(name = "u-eda")]
#[command(about = "Exploratory data analysis for CSV tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify columns and optionally draw distribution figures
    Summary {
        /// Input CSV file
        csv: PathBuf,

        /// Columns to leave out
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// Unique-ratio threshold below which a column is categorical
        #[arg(long, default_value_t = DEFAULT_UNIQUE_RATIO_THRESHOLD)]
        threshold: f64,

        /// Directory for the SVG figures
        #[arg(long)]
        plot_dir: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Boxplot statistics for numeric columns
    Boxplots {
        /// Input CSV file
        csv: PathBuf,

        /// Columns to leave out
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// SVG file for the figure
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Z-score standardize numeric columns and write the table as CSV
    Standardize {
        /// Input CSV file
        csv: PathBuf,

        /// Columns to standardize [default: Avg_Daily_Usage_Hours,Sleep_Hours_Per_Night]
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Output CSV file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Pairwise chi-squared, t-test and ANOVA
    Tests {
        /// Input CSV file
        csv: PathBuf,

        /// Columns whose labels are cleaned before testing
        #[arg(long, value_delimiter = ',')]
        binary: Vec<String>,

        /// Significance level
        #[arg(long, default_value_t = 0.05)]
        alpha: f64,

        /// Disable Yates' continuity correction on 2x2 tables
        #[arg(long)]
        no_yates: bool,

        /// Print all results as JSON instead of the report
        #[arg(long)]
        json: bool,
    },
}

fn load(path: &Path) -> Result<DataFrame> {
    CsvParser::new()
        .parse_file(path)
        .with_context(|| format!("failed to read {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Summary {
            csv,
            exclude,
            threshold,
            plot_dir,
            json,
        } => {
            let df = load(&csv)?;
            let config = AnalyzeConfig {
                exclude_cols: exclude,
                threshold,
                plot_dir,
                verbose: !json,
            };
            let analysis = analyze_dataframe(&df, &config).context("analysis failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                println!("Categorical columns: {:?}", analysis.categorical_cols);
                println!("Numeric columns: {:?}", analysis.numeric_cols);
                for plot in &analysis.plots {
                    println!("Wrote {}", plot.display());
                }
            }
        }

        Commands::Boxplots {
            csv,
            exclude,
            output,
            json,
        } => {
            let df = load(&csv)?;
            let report = plot_boxplots_before_outliers(&df, &exclude, &BoxplotConfig { output })
                .context("boxplots failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for column in &report.columns {
                    match &column.stats {
                        Some(s) => println!(
                            "{}: q1={:.3} median={:.3} q3={:.3} \
                             whiskers=[{:.3}, {:.3}] outliers={}",
                            column.name,
                            s.q1,
                            s.median,
                            s.q3,
                            s.whisker_low,
                            s.whisker_high,
                            s.outliers.len()
                        ),
                        None => println!("{}: no values", column.name),
                    }
                }
                if let Some(plot) = &report.plot {
                    println!("Wrote {}", plot.display());
                }
            }
        }

        Commands::Standardize {
            csv,
            columns,
            output,
        } => {
            let df = load(&csv)?;
            let mut config = StandardizeConfig {
                verbose: output.is_some(),
                ..StandardizeConfig::default()
            };
            if !columns.is_empty() {
                config.columns = columns;
            }
            let out = standardize_numeric_columns(&df, &config).context("standardization failed")?;
            match output {
                Some(path) => write_csv_file(&out, &path)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => write_csv(&out, std::io::stdout().lock())?,
            }
        }

        Commands::Tests {
            csv,
            binary,
            alpha,
            no_yates,
            json,
        } => {
            let df = load(&csv)?;
            let config = TestConfig {
                binary_columns: (!binary.is_empty()).then_some(binary),
                alpha,
                verbose: !json,
                yates_correction: !no_yates,
            };
            let report = run_statistical_tests(&df, &config).context("statistical tests failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
    }

    Ok(())
}
