use crate::cli::MergeArgs;
use crate::config::PipelineConfig;
use crate::pipeline::{self, RunSummary};

pub fn run(args: &MergeArgs) -> Result<(), i32> {
    let config = PipelineConfig::resolve(args.config.as_deref(), args.overrides()).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;

    let summary = pipeline::run(&config).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;

    print!("{}", render_summary(&summary, &config));
    Ok(())
}

fn render_summary(summary: &RunSummary, config: &PipelineConfig) -> String {
    let mut out = format!(
        "Processed {} PDFs: {} extracted, {} failed\n",
        summary.documents,
        summary.extracted,
        summary.failed.len()
    );
    if !summary.intermediate_files.is_empty() {
        out.push_str(&format!(
            "Wrote {} table files to {}\n",
            summary.intermediate_files.len(),
            config.intermediate_dir.display()
        ));
    }
    match &summary.merged {
        Some((path, rows)) => {
            out.push_str(&format!(
                "Saved merged dataset: {} ({rows} rows)\n",
                path.display()
            ));
        }
        None => out.push_str("No valid data extracted from PDFs.\n"),
    }
    if !summary.failed.is_empty() {
        out.push_str("PDFs failed:\n");
        for file in &summary.failed {
            out.push_str(&format!("  - {file}\n"));
        }
    }
    out.push_str(&format!(
        "Extraction complete. Check '{}' for details.\n",
        config.log_file.display()
    ));
    out
}
