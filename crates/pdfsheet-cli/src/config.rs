//! Run configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! command-line flags. Every key of the file is optional:
//!
//! ```toml
//! input_dir = "reports"
//! output = "merged.csv"
//! intermediate_dir = "tables"
//! log_file = "errors.txt"
//! target_columns = ["pH", "TDS"]
//! strategies = ["lattice", "text"]
//!
//! [detection]
//! snap_tolerance = 2.0
//! min_words_vertical = 2
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use pdfsheet::{Strategy, TableSettings, WordOptions};
use serde::Deserialize;

use crate::error::PipelineError;

/// One way of pulling tables out of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStrategy {
    /// Cells bounded by ruling lines
    Lattice,
    /// Columns aligned by whitespace
    Stream,
    /// Whitespace-split text lines, one table per document
    Text,
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExtractionStrategy::Lattice => "lattice",
            ExtractionStrategy::Stream => "stream",
            ExtractionStrategy::Text => "text",
        })
    }
}

/// Tolerances for table detection and word grouping, in points.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectionConfig {
    pub snap_tolerance: f64,
    pub join_tolerance: f64,
    pub edge_min_length: f64,
    pub intersection_tolerance: f64,
    pub text_tolerance: f64,
    pub min_words_vertical: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        let table = TableSettings::default();
        Self {
            snap_tolerance: table.snap_tolerance,
            join_tolerance: table.join_tolerance,
            edge_min_length: table.edge_min_length,
            intersection_tolerance: table.intersection_tolerance,
            text_tolerance: table.text_tolerance,
            min_words_vertical: table.min_words_vertical,
        }
    }
}

impl DetectionConfig {
    pub fn table_settings(&self, strategy: Strategy) -> TableSettings {
        TableSettings {
            strategy,
            snap_tolerance: self.snap_tolerance,
            join_tolerance: self.join_tolerance,
            edge_min_length: self.edge_min_length,
            min_words_vertical: self.min_words_vertical,
            text_tolerance: self.text_tolerance,
            intersection_tolerance: self.intersection_tolerance,
        }
    }

    pub fn word_options(&self) -> WordOptions {
        WordOptions {
            x_tolerance: self.text_tolerance,
            y_tolerance: self.text_tolerance,
        }
    }
}

/// Everything a merge run needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output: PathBuf,
    pub intermediate_dir: PathBuf,
    pub log_file: PathBuf,
    /// Columns kept when a table has any of them, in this order.
    pub target_columns: Vec<String>,
    /// Tried in order until one yields a table.
    pub strategies: Vec<ExtractionStrategy>,
    pub detection: DetectionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("PDF"),
            output: PathBuf::from("merged_dataset.csv"),
            intermediate_dir: PathBuf::from("temp_csvs"),
            log_file: PathBuf::from("extraction_log.txt"),
            target_columns: ["Turbidity", "Temperature", "pH", "TDS"]
                .map(String::from)
                .to_vec(),
            strategies: vec![
                ExtractionStrategy::Lattice,
                ExtractionStrategy::Stream,
                ExtractionStrategy::Text,
            ],
            detection: DetectionConfig::default(),
        }
    }
}

/// Values given on the command line. `None` and empty lists leave the
/// underlying layer untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub intermediate_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub target_columns: Vec<String>,
    pub strategies: Vec<ExtractionStrategy>,
    pub snap_tolerance: Option<f64>,
    pub join_tolerance: Option<f64>,
    pub text_tolerance: Option<f64>,
}

impl PipelineConfig {
    /// Parse a TOML document on top of the defaults.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read a TOML config file.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| PipelineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then `file` if given, then `overrides`.
    pub fn resolve(file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, PipelineError> {
        let config = match file {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(config.with_overrides(overrides))
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(dir) = overrides.input_dir {
            self.input_dir = dir;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(dir) = overrides.intermediate_dir {
            self.intermediate_dir = dir;
        }
        if let Some(log_file) = overrides.log_file {
            self.log_file = log_file;
        }
        if !overrides.target_columns.is_empty() {
            self.target_columns = overrides.target_columns;
        }
        if !overrides.strategies.is_empty() {
            self.strategies = overrides.strategies;
        }
        if let Some(tol) = overrides.snap_tolerance {
            self.detection.snap_tolerance = tol;
        }
        if let Some(tol) = overrides.join_tolerance {
            self.detection.join_tolerance = tol;
        }
        if let Some(tol) = overrides.text_tolerance {
            self.detection.text_tolerance = tol;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.input_dir, PathBuf::from("PDF"));
        assert_eq!(config.output, PathBuf::from("merged_dataset.csv"));
        assert_eq!(config.intermediate_dir, PathBuf::from("temp_csvs"));
        assert_eq!(config.log_file, PathBuf::from("extraction_log.txt"));
        assert_eq!(
            config.target_columns,
            vec!["Turbidity", "Temperature", "pH", "TDS"]
        );
        assert_eq!(
            config.strategies,
            vec![
                ExtractionStrategy::Lattice,
                ExtractionStrategy::Stream,
                ExtractionStrategy::Text
            ]
        );
        assert_eq!(config.detection.snap_tolerance, 3.0);
        assert_eq!(config.detection.text_tolerance, 3.0);
    }

    #[test]
    fn empty_file_is_defaults() {
        assert_eq!(
            PipelineConfig::from_toml("").unwrap(),
            PipelineConfig::default()
        );
    }

    #[test]
    fn file_overrides_defaults() {
        let config = PipelineConfig::from_toml(
            r#"
            output = "all.csv"
            target_columns = ["pH"]
            strategies = ["stream", "text"]

            [detection]
            snap_tolerance = 1.5
            "#,
        )
        .unwrap();
        assert_eq!(config.output, PathBuf::from("all.csv"));
        assert_eq!(config.target_columns, vec!["pH"]);
        assert_eq!(
            config.strategies,
            vec![ExtractionStrategy::Stream, ExtractionStrategy::Text]
        );
        assert_eq!(config.detection.snap_tolerance, 1.5);
        assert_eq!(config.detection.join_tolerance, 3.0);
        assert_eq!(config.input_dir, PathBuf::from("PDF"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(PipelineConfig::from_toml("outptu = \"x.csv\"").is_err());
        assert!(PipelineConfig::from_toml("strategies = [\"ocr\"]").is_err());
    }

    #[test]
    fn flags_override_file() {
        let file = PipelineConfig::from_toml("output = \"file.csv\"\nlog_file = \"file.log\"").unwrap();
        let config = file.with_overrides(ConfigOverrides {
            output: Some(PathBuf::from("flag.csv")),
            strategies: vec![ExtractionStrategy::Text],
            text_tolerance: Some(1.0),
            ..ConfigOverrides::default()
        });
        assert_eq!(config.output, PathBuf::from("flag.csv"));
        assert_eq!(config.log_file, PathBuf::from("file.log"));
        assert_eq!(config.strategies, vec![ExtractionStrategy::Text]);
        assert_eq!(config.detection.text_tolerance, 1.0);
        assert_eq!(config.detection.word_options().x_tolerance, 1.0);
    }

    #[test]
    fn resolve_reports_missing_file() {
        let err = PipelineConfig::resolve(
            Some(Path::new("/nonexistent/pdfsheet.toml")),
            ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::ConfigRead { .. }));
    }

    #[test]
    fn table_settings_carry_tolerances() {
        let detection = DetectionConfig {
            snap_tolerance: 1.0,
            min_words_vertical: 2,
            ..DetectionConfig::default()
        };
        let settings = detection.table_settings(Strategy::Stream);
        assert_eq!(settings.strategy, Strategy::Stream);
        assert_eq!(settings.snap_tolerance, 1.0);
        assert_eq!(settings.min_words_vertical, 2);
        assert_eq!(settings.join_tolerance, 3.0);
    }
}
