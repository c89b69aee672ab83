use std::sync::LazyLock;

use regex::Regex;

/// Label used when a filename carries no recognizable year.
pub const UNKNOWN_YEAR: &str = "Unknown";

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"20[1-2][0-9]").expect("year pattern is a valid regex"));

/// First 4-digit token between 2010 and 2029 found anywhere in `filename`.
///
/// The match is not anchored to word boundaries, so `Report2021.pdf` and
/// `x20215y` both give `2021`. Returns [`UNKNOWN_YEAR`] when nothing matches.
pub fn extract_year(filename: &str) -> String {
    YEAR_PATTERN
        .find(filename)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_YEAR.to_string())
}
