//! Caption resolution configuration.
//!
//! Caption patterns are externally supplied strings, not hard-coded
//! regexes, so the resolver stays pure and testable against synthetic
//! element lists. A [`CaptionConfig`] is the serializable form; calling
//! [`CaptionConfig::compile`] validates the patterns and produces the
//! [`CaptionQuery`] consumed by the resolver. An invalid pattern is a
//! contract violation and surfaces as [`SegmentError::Config`].

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::errors::{SegResult, SegmentError};

/// Default header pattern: a "Table" caption followed by a numeral.
pub const TABLE_HEADER_PATTERN: &str = r"(?i)(Table)\s?(\d+\.?)(.*|$)";

/// Header pattern tolerant of OCR digit confusions ("I", "l" and "|" are
/// accepted where a "1" was printed).
pub const TABLE_HEADER_PATTERN_LOOSE: &str = r"(?i)(Table)\s?([Il|\d]+\.?)(.*|$)";

/// Figure caption pattern, with the same OCR tolerance.
pub const FIGURE_HEADER_PATTERN: &str = r"(?i)(Fig\.?|Figure)\s?([Il|\d]+\.?)(.*|$)";

/// Combined anchor for backends that do not distinguish tables from
/// figures structurally; the leading token of the resolved caption
/// decides the segment kind.
pub const FLOAT_HEADER_PATTERN: &str = r"(?i)(Table|Fig\.?|Figure)\s?([Il|\d]+\.?)(.*|$)";

/// Caption embedded in a table's own cell-delimited text: everything from
/// the "Table N" anchor up to the first cell separator.
pub const TABLE_CURRENT_PATTERN: &str = r"(?i)(Table)\s?(\d+\.?)([^|]*)";

/// Footer pattern accepting any adjacent text.
pub const ANY_TEXT_PATTERN: &str = r".*";

/// Caption window configuration for one backend.
///
/// `look_ahead` bounds how many elements before (header) and after
/// (footer) the target are scanned. Footer scanning is disabled entirely
/// when `footer_pattern` is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionConfig {
    /// Number of elements scanned in each direction.
    pub look_ahead: usize,
    /// Pattern a preceding element must match to become the header.
    pub header_pattern: String,
    /// Pattern a succeeding element must match to become the footer.
    pub footer_pattern: Option<String>,
    /// Pattern searched in the target element's own text, for backends
    /// that embed the caption inside the extracted table text.
    pub current_pattern: Option<String>,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            look_ahead: 2,
            header_pattern: TABLE_HEADER_PATTERN.to_string(),
            footer_pattern: None,
            current_pattern: None,
        }
    }
}

impl CaptionConfig {
    /// Compiles the configured patterns into a resolver query.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::Config`] when any pattern fails to compile.
    pub fn compile(&self) -> SegResult<CaptionQuery> {
        Ok(CaptionQuery {
            look_ahead: self.look_ahead,
            header: compile_pattern("header_pattern", &self.header_pattern)?,
            footer: self
                .footer_pattern
                .as_deref()
                .map(|p| compile_pattern("footer_pattern", p))
                .transpose()?,
            current: self
                .current_pattern
                .as_deref()
                .map(|p| compile_pattern("current_pattern", p))
                .transpose()?,
        })
    }
}

fn compile_pattern(field: &str, pattern: &str) -> SegResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| SegmentError::config_with_context(field, pattern, &e.to_string()))
}

/// Compiled caption query, ready to be driven by the resolver.
#[derive(Debug, Clone)]
pub struct CaptionQuery {
    pub(crate) look_ahead: usize,
    pub(crate) header: Regex,
    pub(crate) footer: Option<Regex>,
    pub(crate) current: Option<Regex>,
}

impl CaptionQuery {
    /// Number of elements scanned in each direction.
    pub fn look_ahead(&self) -> usize {
        self.look_ahead
    }
}
