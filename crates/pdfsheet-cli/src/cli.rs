use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{ConfigOverrides, ExtractionStrategy};

/// Merge the tables of a directory of PDF reports into one CSV dataset.
#[derive(Debug, Parser)]
#[command(name = "pdfsheet", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract, clean and merge the tables of every PDF in a directory
    Merge(MergeArgs),

    /// Print the raw tables detected in one PDF
    Tables {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Strategies to try in order, stopping at the first that finds a table
        #[arg(long, value_enum, value_delimiter = ',')]
        strategy: Vec<ExtractionStrategy>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// TOML configuration file
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Directory holding the PDF files [default: PDF]
    #[arg(value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Merged dataset path [default: merged_dataset.csv]
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Directory for per-table CSV files [default: temp_csvs]
    #[arg(long)]
    pub intermediate_dir: Option<PathBuf>,

    /// Error log path [default: extraction_log.txt]
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Column to keep when present; repeat for several [default: Turbidity, Temperature, pH, TDS]
    #[arg(long = "target-col", value_name = "NAME")]
    pub target_columns: Vec<String>,

    /// Strategies to try in order [default: lattice,stream,text]
    #[arg(long, value_enum, value_delimiter = ',')]
    pub strategy: Vec<ExtractionStrategy>,

    /// Distance within which parallel ruling lines are merged (default: 3.0)
    #[arg(long)]
    pub snap_tolerance: Option<f64>,

    /// Gap within which collinear ruling lines are joined (default: 3.0)
    #[arg(long)]
    pub join_tolerance: Option<f64>,

    /// Tolerance for grouping characters into words and lines (default: 3.0)
    #[arg(long)]
    pub text_tolerance: Option<f64>,

    /// TOML configuration file; flags take precedence over its values
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl MergeArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input_dir: self.input_dir.clone(),
            output: self.output.clone(),
            intermediate_dir: self.intermediate_dir.clone(),
            log_file: self.log_file.clone(),
            target_columns: self.target_columns.clone(),
            strategies: self.strategy.clone(),
            snap_tolerance: self.snap_tolerance,
            join_tolerance: self.join_tolerance,
            text_tolerance: self.text_tolerance,
        }
    }
}

/// Output format for the tables subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated rows, tables separated by a blank line
    Csv,
    /// A JSON array of tables
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn merge_flags() {
        let cli = Cli::parse_from([
            "pdfsheet",
            "merge",
            "reports",
            "--output",
            "all.csv",
            "--target-col",
            "pH",
            "--target-col",
            "TDS",
            "--strategy",
            "stream,text",
            "--snap-tolerance",
            "1.5",
        ]);
        let Commands::Merge(args) = cli.command else {
            panic!("expected merge");
        };
        let overrides = args.overrides();
        assert_eq!(overrides.input_dir, Some(PathBuf::from("reports")));
        assert_eq!(overrides.output, Some(PathBuf::from("all.csv")));
        assert_eq!(overrides.target_columns, vec!["pH", "TDS"]);
        assert_eq!(
            overrides.strategies,
            vec![ExtractionStrategy::Stream, ExtractionStrategy::Text]
        );
        assert_eq!(overrides.snap_tolerance, Some(1.5));
        assert_eq!(overrides.join_tolerance, None);
    }

    #[test]
    fn merge_without_flags_overrides_nothing() {
        let cli = Cli::parse_from(["pdfsheet", "merge"]);
        let Commands::Merge(args) = cli.command else {
            panic!("expected merge");
        };
        let overrides = args.overrides();
        assert!(overrides.input_dir.is_none());
        assert!(overrides.strategies.is_empty());
        assert!(overrides.target_columns.is_empty());
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        assert!(Cli::try_parse_from(["pdfsheet", "merge", "--strategy", "ocr"]).is_err());
    }

    #[test]
    fn tables_defaults_to_csv() {
        let cli = Cli::parse_from(["pdfsheet", "tables", "report.pdf"]);
        match cli.command {
            Commands::Tables { format, strategy, .. } => {
                assert_eq!(format, OutputFormat::Csv);
                assert!(strategy.is_empty());
            }
            other => panic!("expected tables, got {other:?}"),
        }
    }
}
