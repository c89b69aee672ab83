//! Directory-to-dataset merge pipeline.
//!
//! Documents are processed one at a time in file name order. A document that
//! cannot be opened or yields no tables is recorded as failed and the run
//! continues; only I/O on the outputs and the log ends a run early.

use std::path::{Path, PathBuf};

use pdfsheet::{Frame, Pdf, Value, clean, extract_year};
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::error_log::ErrorLog;
use crate::extract::extract_tables;
use crate::output::{intermediate_file_name, write_frame};

/// Reason recorded when every strategy comes up empty.
pub const NO_TABLES: &str = "No tables/text extracted.";

/// A cleaned, year-stamped table and where it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTable {
    pub path: PathBuf,
    pub frame: Frame,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    Extracted {
        file: String,
        year: String,
        /// Raw tables found, including ones that cleaned to nothing.
        found: usize,
        tables: Vec<CleanedTable>,
    },
    Failed {
        file: String,
        reason: String,
    },
}

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub documents: usize,
    pub extracted: usize,
    /// File names of failed documents, in processing order.
    pub failed: Vec<String>,
    pub intermediate_files: Vec<PathBuf>,
    /// Path and row count of the merged dataset, when one was written.
    pub merged: Option<(PathBuf, usize)>,
}

/// PDF files directly inside `dir`, sorted by file name.
///
/// Matches the `.pdf` suffix case-insensitively; subdirectories are not
/// searched.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let to_dir_error = |source| PipelineError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(to_dir_error)? {
        let path = entry.map_err(to_dir_error)?.path();
        let is_pdf = path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase().ends_with(".pdf"))
            .unwrap_or(false);
        if is_pdf && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Extract, clean, stamp and persist the tables of one document.
///
/// Strategy errors are written to `log` as they happen. Errors opening the
/// document and documents without tables come back as
/// [`DocumentOutcome::Failed`]; the caller logs those.
pub fn process_document(
    path: &Path,
    config: &PipelineConfig,
    log: &ErrorLog,
) -> Result<DocumentOutcome, PipelineError> {
    let file = file_name(path);
    let year = extract_year(&file);
    info!("Processing {file} (Year: {year})");

    let pdf = match Pdf::open_file(path) {
        Ok(pdf) => pdf,
        Err(e) => {
            return Ok(DocumentOutcome::Failed {
                file,
                reason: e.to_string(),
            });
        }
    };

    let extraction = extract_tables(&pdf, &config.strategies, &config.detection);
    for failure in &extraction.failures {
        let message = format!(
            "{} extraction failed for {}: {}",
            failure.strategy,
            path.display(),
            failure.error
        );
        warn!("{message}");
        log.append(&message)?;
    }
    if extraction.tables.is_empty() {
        return Ok(DocumentOutcome::Failed {
            file,
            reason: NO_TABLES.to_string(),
        });
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.clone());
    let found = extraction.tables.len();
    let mut tables = Vec::new();
    for (index, raw) in extraction.tables.iter().enumerate() {
        let frame = clean(raw, &config.target_columns);
        if frame.is_empty() {
            continue;
        }
        let frame = frame.with_column("Year", Value::Text(year.clone()));
        let out = config
            .intermediate_dir
            .join(intermediate_file_name(&stem, &year, index));
        write_frame(&out, &frame)?;
        tables.push(CleanedTable { path: out, frame });
    }

    Ok(DocumentOutcome::Extracted {
        file,
        year,
        found,
        tables,
    })
}

/// Run the whole pipeline over `config.input_dir`.
pub fn run(config: &PipelineConfig) -> Result<RunSummary, PipelineError> {
    std::fs::create_dir_all(&config.intermediate_dir).map_err(|source| {
        PipelineError::CreateDir {
            path: config.intermediate_dir.clone(),
            source,
        }
    })?;
    let log = ErrorLog::new(&config.log_file);

    let pdfs = discover_pdfs(&config.input_dir)?;
    info!("Found {} PDFs", pdfs.len());

    let mut summary = RunSummary {
        documents: pdfs.len(),
        ..RunSummary::default()
    };
    let mut frames = Vec::new();

    for path in &pdfs {
        match process_document(path, config, &log)? {
            DocumentOutcome::Extracted {
                file,
                year,
                found,
                tables,
            } => {
                info!(%year, "{found} tables processed from {file}");
                summary.extracted += 1;
                for table in tables {
                    summary.intermediate_files.push(table.path);
                    frames.push(table.frame);
                }
            }
            DocumentOutcome::Failed { file, reason } => {
                let message = format!("Failed {file}: {reason}");
                warn!("{message}");
                log.append(&message)?;
                summary.failed.push(file);
            }
        }
    }

    if !frames.is_empty() {
        let merged = Frame::concat(&frames);
        write_frame(&config.output, &merged)?;
        info!("Merged {} tables into {}", frames.len(), config.output.display());
        summary.merged = Some((config.output.clone(), merged.len()));
    }

    Ok(summary)
}
