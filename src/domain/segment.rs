//! Segment records and the per-document segment collection.
//!
//! A [`Segment`] is one logical content block (table, figure or text
//! section) assembled from a backend's detections plus the resolved
//! caption. Segments are created once per detection during a single
//! document pass and owned by the [`Segments`] collection; later review
//! stages may overwrite `header`/`footer` with human-corrected values,
//! everything else is write-once.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::ops::Index;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::element::Coordinates;
use crate::processors::captions::{FIGURE_NUMBER_RE, TABLE_NUMBER_RE, extract_caption_number};

static FIGURE_LEAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(fig\.?|figure)\b").unwrap_or_else(|e| panic!("figure lead regex: {e}"))
});
static TABLE_LEAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(tab\.?|table)\b").unwrap_or_else(|e| panic!("table lead regex: {e}"))
});

/// Kind of content a segment holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// A section of running text.
    Text,
    /// A tabular region.
    Table,
    /// A figure or chart region.
    Figure,
}

impl SegmentKind {
    /// Classifies a detection by its caption's leading token, for
    /// backends that do not distinguish tables from figures structurally.
    ///
    /// "Figure 2." / "Fig. 2" classify as [`SegmentKind::Figure`],
    /// "Table 3." / "Tab. 3" as [`SegmentKind::Table`]; anything else is
    /// left to the caller's default.
    pub fn from_caption(caption: &str) -> Option<Self> {
        if FIGURE_LEAD_RE.is_match(caption) {
            Some(SegmentKind::Figure)
        } else if TABLE_LEAD_RE.is_match(caption) {
            Some(SegmentKind::Table)
        } else {
            None
        }
    }
}

/// Opaque reference to the backend-native object a segment was built
/// from. Kept purely for traceability; never serialized and never part
/// of segment equality.
#[derive(Clone)]
pub struct OriginalRef(Arc<dyn Any + Send + Sync>);

impl OriginalRef {
    /// Wraps a backend-native value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Downcasts back to the backend-native type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl std::fmt::Debug for OriginalRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OriginalRef(..)")
    }
}

/// One logical content block extracted from a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Unique identifier of the segment.
    pub id: Uuid,
    /// Kind of content.
    pub kind: SegmentKind,
    /// Resolved caption, trimmed. May be empty when nothing matched.
    pub header: String,
    /// Optional trailing caption (acronym legends, notes).
    pub footer: Option<String>,
    /// 1-based page number.
    pub page_number: u32,
    /// Content as plain text.
    pub text: String,
    /// Content as HTML, for tables and extracted figures.
    pub html: Option<String>,
    /// Path to a rendered crop of the region, when upstream produced one.
    pub image: Option<String>,
    /// Name of the producing backend.
    pub source: String,
    /// Detection confidence reported by the backend.
    pub probability: Option<f32>,
    /// Bounding geometry in the backend's coordinate space.
    pub coords: Option<Coordinates>,
    /// Outline level, for text segments in a section hierarchy.
    pub level: Option<u32>,
    /// Parent segment in the section hierarchy.
    pub parent: Option<Uuid>,
    /// Backend-native object this segment was extracted from.
    #[serde(skip)]
    pub original: Option<OriginalRef>,
}

impl Segment {
    /// Creates an empty segment of the given kind.
    pub fn new(kind: SegmentKind, page_number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            header: String::new(),
            footer: None,
            page_number,
            text: String::new(),
            html: None,
            image: None,
            source: String::new(),
            probability: None,
            coords: None,
            level: None,
            parent: None,
            original: None,
        }
    }

    /// Sets the resolved caption (trimmed).
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into().trim().to_string();
        self
    }

    /// Sets the trailing caption (trimmed; empty becomes `None`).
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        let footer = footer.into().trim().to_string();
        self.footer = (!footer.is_empty()).then_some(footer);
        self
    }

    /// Sets the plain-text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets the HTML content.
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Sets the rendered crop path.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Sets the producing backend's name.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Sets the detection confidence.
    pub fn with_probability(mut self, probability: f32) -> Self {
        self.probability = Some(probability);
        self
    }

    /// Sets the bounding geometry.
    pub fn with_coords(mut self, coords: Coordinates) -> Self {
        self.coords = Some(coords);
        self
    }

    /// Sets the outline level.
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    /// Sets the parent segment.
    pub fn with_parent(mut self, parent: Uuid) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Attaches the backend-native object for traceability.
    pub fn with_original(mut self, original: OriginalRef) -> Self {
        self.original = Some(original);
        self
    }

    /// The table or figure number parsed from the caption, tolerating
    /// OCR digit confusions. `None` for text segments or unnumbered
    /// captions.
    pub fn number(&self) -> Option<u32> {
        match self.kind {
            SegmentKind::Table => extract_caption_number(&self.header, &TABLE_NUMBER_RE, 1),
            SegmentKind::Figure => extract_caption_number(&self.header, &FIGURE_NUMBER_RE, 2),
            SegmentKind::Text => None,
        }
    }
}

// `original` is excluded from equality: it is a traceability handle, not
// part of the segment's identity.
impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.kind == other.kind
            && self.header == other.header
            && self.footer == other.footer
            && self.page_number == other.page_number
            && self.text == other.text
            && self.html == other.html
            && self.image == other.image
            && self.source == other.source
            && self.probability == other.probability
            && self.coords == other.coords
            && self.level == other.level
            && self.parent == other.parent
    }
}

/// Ordered collection of segments for one document; insertion order is
/// detection order. Duplicate headers are expected before deduplication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segments {
    /// The segments, in detection order.
    pub items: Vec<Segment>,
}

impl Segments {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a segment.
    pub fn push(&mut self, segment: Segment) {
        self.items.push(segment);
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates the segments in detection order.
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.items.iter()
    }

    /// Looks a segment up by id.
    pub fn get(&self, id: Uuid) -> Option<&Segment> {
        self.items.iter().find(|s| s.id == id)
    }

    /// Looks a segment up by its resolved header.
    pub fn get_by_header(&self, header: &str) -> Option<&Segment> {
        self.items.iter().find(|s| s.header == header)
    }

    /// Disambiguates duplicate headers by prefixing the parent section's
    /// header, e.g. two "Study design" subsections become
    /// "Methods: Study design" and "Results: Study design".
    pub fn make_headers_unique(&mut self) {
        let headers: HashMap<Uuid, String> = self
            .items
            .iter()
            .map(|s| (s.id, s.header.clone()))
            .collect();

        let mut seen: HashSet<String> = HashSet::new();
        for segment in &mut self.items {
            if seen.contains(&segment.header) {
                if let Some(parent_header) = segment.parent.and_then(|p| headers.get(&p)) {
                    segment.header = format!("{}: {}", parent_header, segment.header);
                }
            } else {
                seen.insert(segment.header.clone());
            }
        }
    }

    /// Serializes the collection to a JSON value.
    pub fn to_json_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl Index<usize> for Segments {
    type Output = Segment;

    fn index(&self, index: usize) -> &Segment {
        &self.items[index]
    }
}

impl FromIterator<Segment> for Segments {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Segments {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
