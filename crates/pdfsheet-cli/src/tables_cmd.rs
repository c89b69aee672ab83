use std::path::Path;

use pdfsheet::{Layout, Pdf, RawTable};

use crate::cli::OutputFormat;
use crate::config::{ExtractionStrategy, PipelineConfig};
use crate::error::PipelineError;
use crate::extract::{Extraction, extract_tables};
use crate::output::rows_to_csv;

pub fn run(
    file: &Path,
    strategies: &[ExtractionStrategy],
    format: &OutputFormat,
    config: Option<&Path>,
) -> Result<(), i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    let extraction = extract(file, strategies, config).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    for failure in &extraction.failures {
        eprintln!(
            "Warning: {} extraction failed for {}: {}",
            failure.strategy,
            file.display(),
            failure.error
        );
    }

    match format {
        OutputFormat::Csv => write_csv(&extraction.tables),
        OutputFormat::Json => write_json(&extraction.tables, extraction.strategy),
    }
}

fn extract(
    file: &Path,
    strategies: &[ExtractionStrategy],
    config: Option<&Path>,
) -> Result<Extraction, PipelineError> {
    let config = match config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    let strategies = if strategies.is_empty() {
        &config.strategies[..]
    } else {
        strategies
    };

    let pdf = Pdf::open_file(file)?;
    Ok(extract_tables(&pdf, strategies, &config.detection))
}

fn write_csv(tables: &[RawTable]) -> Result<(), i32> {
    if tables.is_empty() {
        println!("No tables found.");
        return Ok(());
    }

    let mut blocks = Vec::with_capacity(tables.len());
    for table in tables {
        let csv = rows_to_csv(&table.rows).map_err(|e| {
            eprintln!("Error: {e}");
            1
        })?;
        blocks.push(csv);
    }
    print!("{}", blocks.join("\n"));
    Ok(())
}

fn write_json(tables: &[RawTable], strategy: Option<ExtractionStrategy>) -> Result<(), i32> {
    let tables: Vec<serde_json::Value> = tables
        .iter()
        .map(|table| {
            serde_json::json!({
                "strategy": strategy.map(|s| s.to_string()),
                "header": table.layout == Layout::HeaderRow,
                "rows": table.rows,
            })
        })
        .collect();

    let json_str = serde_json::to_string(&tables).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    println!("{json_str}");
    Ok(())
}
