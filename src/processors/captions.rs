//! Header/footer caption resolution.
//!
//! Given a target element and the ordered elements of a page, finds the
//! best-matching caption text before (header) and after (footer) the
//! target, within a bounded window. The [`CapturedIndices`] set is shared
//! across all resolver calls of one page scan so that a single caption
//! line ("Table 3. Comparison of ...") can never be attached to two
//! physically adjacent tables.
//!
//! Scanning walks outward one offset at a time. Once the header is
//! non-empty, later backward offsets are skipped by the emptiness guard
//! rather than by breaking the loop, so footer scanning still proceeds
//! independently and may match at a farther offset than the header did.
//! A backward candidate rejected by the filter skips the whole offset,
//! including that offset's forward check.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::config::CaptionQuery;
use crate::domain::element::PageElement;

/// Pattern extracting a table number from a caption, tolerant of OCR
/// digit confusions.
pub static TABLE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Table[:.\s]+([Il|\d]+)").unwrap_or_else(|e| panic!("table number regex: {e}"))
});

/// Figure variant of [`TABLE_NUMBER_RE`]; the number is in group 2.
pub static FIGURE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(fig\.?|figure)[.:\s]*([Il|\d]+)")
        .unwrap_or_else(|e| panic!("figure number regex: {e}"))
});

/// Predicate narrowing which elements may become a header or footer.
pub type ElementFilter<'a> = &'a dyn Fn(&PageElement) -> bool;

/// Set of element indices already consumed as someone's header or footer.
///
/// One value is threaded through every resolver call of a page scan;
/// never promote it to longer-lived state.
#[derive(Debug, Clone, Default)]
pub struct CapturedIndices(HashSet<usize>);

impl CapturedIndices {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the index was already captured.
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    /// Marks an index as captured.
    pub fn insert(&mut self, index: usize) {
        self.0.insert(index);
    }

    /// Number of captured indices.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no index has been captured yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolves the header and footer caption for the element at
/// `start_index`.
///
/// Returns the trimmed header and footer strings; both are empty when no
/// candidate matched inside the window, which is a miss, not an error.
/// `start_index: None` short-circuits to empty results.
///
/// The query's `current` pattern, when present, is searched in the target
/// element's own text first; a match becomes the header immediately and
/// captures the target's index (some backends embed the caption inside
/// the table's extracted text). Footer scanning requires both a footer
/// pattern and a footer filter; without either it is skipped entirely.
pub fn resolve_caption(
    elements: &[PageElement],
    start_index: Option<usize>,
    query: &CaptionQuery,
    header_filter: Option<ElementFilter>,
    footer_filter: Option<ElementFilter>,
    captured: &mut CapturedIndices,
) -> (String, String) {
    let Some(start) = start_index else {
        return (String::new(), String::new());
    };

    let mut header = String::new();
    let mut footer = String::new();

    if let Some(current) = &query.current {
        if let Some(m) = current.find(&elements[start].text) {
            header.push_str(m.as_str());
            header.push('\n');
            captured.insert(start);
        }
    }

    for j in 1..=query.look_ahead {
        // Preceding element: only while the header is still empty.
        if header.trim().is_empty() {
            if let Some(pre_idx) = start.checked_sub(j) {
                let pre = &elements[pre_idx];
                if captured.contains(pre_idx) || header_filter.is_some_and(|f| !f(pre)) {
                    continue;
                }
                if let Some(m) = query.header.find(&pre.text) {
                    header.push_str(m.as_str());
                    header.push('\n');
                    captured.insert(pre_idx);
                }
            }
        }

        // Succeeding element: gated on both footer pattern and filter.
        let suc_idx = start + j;
        if let (Some(pattern), Some(filter)) = (&query.footer, footer_filter) {
            if footer.trim().is_empty() && suc_idx < elements.len() {
                let suc = &elements[suc_idx];
                if captured.contains(suc_idx) || !filter(suc) {
                    continue;
                }
                if let Some(m) = pattern.find(&suc.text) {
                    footer.push_str(m.as_str());
                    footer.push('\n');
                    captured.insert(suc_idx);
                }
            }
        }
    }

    (header.trim().to_string(), footer.trim().to_string())
}

/// Extracts a caption number from `header` using `pattern`, reading the
/// digits from capture group `group`.
///
/// OCR renderings of "1" as "I", "l" or "|" are corrected before
/// parsing; anything that still fails to parse yields `None`.
pub fn extract_caption_number(header: &str, pattern: &Regex, group: usize) -> Option<u32> {
    let caps = pattern.captures(header)?;
    let digits = caps
        .get(group)?
        .as_str()
        .replace(['I', 'l', '|'], "1");
    digits.parse().ok()
}
