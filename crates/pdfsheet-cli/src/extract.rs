//! Ordered table extraction strategies.

use pdfsheet::{Pdf, PdfError, RawTable, Strategy};

use crate::config::{DetectionConfig, ExtractionStrategy};

/// A strategy that raised an error. The run continues with the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyFailure {
    pub strategy: ExtractionStrategy,
    pub error: PdfError,
}

/// Result of trying strategies against one document.
#[derive(Debug, Default)]
pub struct Extraction {
    pub tables: Vec<RawTable>,
    /// The strategy that produced `tables`, if any did.
    pub strategy: Option<ExtractionStrategy>,
    pub failures: Vec<StrategyFailure>,
}

/// Try `strategies` in order and keep the tables of the first one that
/// yields any non-empty table.
pub fn extract_tables(
    pdf: &Pdf,
    strategies: &[ExtractionStrategy],
    detection: &DetectionConfig,
) -> Extraction {
    let mut extraction = Extraction::default();
    for &strategy in strategies {
        match run_strategy(pdf, strategy, detection) {
            Ok(tables) if !tables.is_empty() => {
                extraction.tables = tables;
                extraction.strategy = Some(strategy);
                break;
            }
            Ok(_) => tracing::debug!("{strategy} found no tables"),
            Err(error) => extraction
                .failures
                .push(StrategyFailure { strategy, error }),
        }
    }
    extraction
}

/// Run one strategy over every page. Empty tables are dropped.
pub fn run_strategy(
    pdf: &Pdf,
    strategy: ExtractionStrategy,
    detection: &DetectionConfig,
) -> Result<Vec<RawTable>, PdfError> {
    let tables: Vec<RawTable> = match strategy {
        ExtractionStrategy::Lattice => detect_tables(pdf, detection, Strategy::Lattice)?,
        ExtractionStrategy::Stream => detect_tables(pdf, detection, Strategy::Stream)?,
        ExtractionStrategy::Text => text_table(pdf, detection)?.into_iter().collect(),
    };
    Ok(tables.into_iter().filter(|t| !t.is_empty()).collect())
}

fn detect_tables(
    pdf: &Pdf,
    detection: &DetectionConfig,
    strategy: Strategy,
) -> Result<Vec<RawTable>, PdfError> {
    let settings = detection.table_settings(strategy);
    let mut tables = Vec::new();
    for page in pdf.pages() {
        let page = page?;
        tables.extend(
            page.find_tables(&settings)
                .iter()
                .map(|table| RawTable::header_row(table.to_grid())),
        );
    }
    Ok(tables)
}

/// Every non-blank text line of the document as a row of
/// whitespace-separated tokens.
fn text_table(pdf: &Pdf, detection: &DetectionConfig) -> Result<Option<RawTable>, PdfError> {
    let options = detection.word_options();
    let mut rows = Vec::new();
    for page in pdf.pages() {
        for line in page?.text_lines(&options) {
            let row: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            if !row.is_empty() {
                rows.push(row);
            }
        }
    }
    Ok((!rows.is_empty()).then(|| RawTable::unlabeled(rows)))
}
