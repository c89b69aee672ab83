//! A single interpreted page.

use pdfsheet_core::{
    Char, Edge, Table, TableFinder, TableSettings, Word, WordExtractor, WordOptions,
    words_to_lines,
};

/// One page of a PDF document with its extracted content.
///
/// Coordinates use a top-left origin in points.
#[derive(Debug, Clone)]
pub struct Page {
    index: usize,
    width: f64,
    height: f64,
    chars: Vec<Char>,
    edges: Vec<Edge>,
}

impl Page {
    /// Create a page from already-extracted content.
    pub fn new(
        index: usize,
        (width, height): (f64, f64),
        chars: Vec<Char>,
        edges: Vec<Edge>,
    ) -> Self {
        Self {
            index,
            width,
            height,
            chars,
            edges,
        }
    }

    /// Returns the page index (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the page width in points.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns the page height in points.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns the characters extracted from this page.
    pub fn chars(&self) -> &[Char] {
        &self.chars
    }

    /// Returns the ruling edges drawn on this page.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Extract words from this page using the specified options.
    pub fn extract_words(&self, options: &WordOptions) -> Vec<Word> {
        WordExtractor::extract(&self.chars, options)
    }

    /// Text lines top to bottom, words separated by single spaces.
    pub fn text_lines(&self, options: &WordOptions) -> Vec<String> {
        let words = self.extract_words(options);
        words_to_lines(&words, options.y_tolerance)
            .into_iter()
            .map(|line| {
                line.iter()
                    .map(|w| w.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    /// Detect tables on this page.
    pub fn find_tables(&self, settings: &TableSettings) -> Vec<Table> {
        TableFinder::new(self.edges.clone(), &self.chars, settings.clone()).find_tables()
    }
}
