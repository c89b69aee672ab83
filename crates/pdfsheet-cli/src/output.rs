//! CSV output for cleaned and merged frames.

use std::path::Path;

use pdfsheet::Frame;

use crate::error::PipelineError;

/// `{stem}_{year}_{index}.csv`
pub fn intermediate_file_name(stem: &str, year: &str, index: usize) -> String {
    format!("{stem}_{year}_{index}.csv")
}

/// Write a frame as CSV: one header row, no index column, missing cells
/// empty. An existing file is overwritten.
pub fn write_frame(path: &Path, frame: &Frame) -> Result<(), PipelineError> {
    let to_csv_error = |source| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(to_csv_error)?;
    writer.write_record(frame.columns()).map_err(to_csv_error)?;
    for row in frame.rows() {
        writer
            .write_record(row.iter().map(ToString::to_string))
            .map_err(to_csv_error)?;
    }
    writer
        .flush()
        .map_err(|e| to_csv_error(csv::Error::from(e)))
}

/// Raw string rows as CSV text, for console output.
pub fn rows_to_csv(rows: &[Vec<String>]) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
