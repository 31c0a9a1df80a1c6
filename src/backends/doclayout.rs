//! Region-detector backend adapter.
//!
//! Translates the output of a pixel-space layout detector (annotated
//! regions per page raster, with confidence scores) into segments. The
//! caption filters are geometric: a candidate caption must be a text
//! region vertically stacked with the table, no wider than the table
//! plus tolerance.

use serde::{Deserialize, Serialize};

use super::LayoutBackend;
use crate::core::config::{
    ANY_TEXT_PATTERN, CaptionConfig, CaptionQuery, FIGURE_HEADER_PATTERN,
    TABLE_HEADER_PATTERN_LOOSE,
};
use crate::core::errors::SegResult;
use crate::domain::element::{Coordinates, ElementCategory, PageElement, WidthRelation};
use crate::domain::segment::{OriginalRef, Segment, SegmentKind, Segments};
use crate::processors::captions::{CapturedIndices, resolve_caption};

/// Fraction of the layout width two stacked regions' edges may differ by.
const VSTACK_TOL: f32 = 0.05;

/// One detected region on a page raster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocLayoutAnnotation {
    /// Detected region category.
    pub category: ElementCategory,
    /// Text extracted from the region; may be empty.
    pub text: String,
    /// HTML rendering of the region's table structure, when recognized.
    pub html: Option<String>,
    /// Detection confidence.
    pub score: Option<f32>,
    /// Region bounds as `[ulx, uly, lrx, lry]` in raster pixels.
    pub bbox: [f32; 4],
    /// Path to a pre-rendered crop of the region, when upstream made one.
    pub image: Option<String>,
}

/// One analyzed page: raster size plus annotations in reading order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocLayoutPage {
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// Detected regions, in the detector's reading order.
    pub annotations: Vec<DocLayoutAnnotation>,
}

/// Adapter for the region-detector backend.
#[derive(Debug, Clone)]
pub struct DocLayoutBackend {
    table_query: CaptionQuery,
    figure_query: CaptionQuery,
}

impl DocLayoutBackend {
    /// Creates the adapter with the default caption windows: two
    /// elements of look-ahead, OCR-tolerant "Table"/"Figure" anchors,
    /// any stacked text accepted as a footer.
    pub fn new() -> SegResult<Self> {
        let table = CaptionConfig {
            look_ahead: 2,
            header_pattern: TABLE_HEADER_PATTERN_LOOSE.to_string(),
            footer_pattern: Some(ANY_TEXT_PATTERN.to_string()),
            current_pattern: None,
        };
        let figure = CaptionConfig {
            header_pattern: FIGURE_HEADER_PATTERN.to_string(),
            ..table.clone()
        };
        Self::from_configs(&table, &figure)
    }

    /// Creates the adapter with caller-supplied caption configuration.
    pub fn from_configs(table: &CaptionConfig, figure: &CaptionConfig) -> SegResult<Self> {
        Ok(Self {
            table_query: table.compile()?,
            figure_query: figure.compile()?,
        })
    }
}

impl LayoutBackend for DocLayoutBackend {
    type Document = Vec<DocLayoutPage>;

    fn name(&self) -> &'static str {
        "doclayout"
    }

    fn segments(&self, document: &Self::Document) -> SegResult<Segments> {
        let mut segments = Segments::new();

        for (page_idx, page) in document.iter().enumerate() {
            let page_number = page_idx as u32 + 1;
            let elements: Vec<PageElement> = page
                .annotations
                .iter()
                .enumerate()
                .map(|(i, ann)| {
                    PageElement::new(i, page_number, ann.category, ann.text.clone()).with_coords(
                        Coordinates::from_rect(ann.bbox[0], ann.bbox[1], ann.bbox[2], ann.bbox[3])
                            .with_layout_size(page.width, page.height),
                    )
                })
                .collect();

            // One captured-index set per page scan.
            let mut captured = CapturedIndices::new();

            for (i, ann) in page.annotations.iter().enumerate() {
                let (kind, query) = match ann.category {
                    ElementCategory::Table => (SegmentKind::Table, &self.table_query),
                    ElementCategory::Figure => (SegmentKind::Figure, &self.figure_query),
                    _ => continue,
                };

                let region = elements[i].coords.clone();
                let stacked_text = |e: &PageElement| {
                    e.category.is_text()
                        && match (&region, &e.coords) {
                            (Some(r), Some(c)) => {
                                r.is_vstacked(c, WidthRelation::Smaller, VSTACK_TOL)
                            }
                            _ => true,
                        }
                };

                let (header, footer) = resolve_caption(
                    &elements,
                    Some(i),
                    query,
                    Some(&stacked_text),
                    Some(&stacked_text),
                    &mut captured,
                );

                let mut segment = Segment::new(kind, page_number)
                    .with_header(format!("{header}{footer}"))
                    .with_text(ann.text.clone())
                    .with_source(self.name())
                    .with_original(OriginalRef::new(ann.clone()));
                if let Some(coords) = &elements[i].coords {
                    segment = segment.with_coords(coords.clone());
                }
                if let Some(html) = &ann.html {
                    segment = segment.with_html(html.clone());
                }
                if let Some(image) = &ann.image {
                    segment = segment.with_image(image.clone());
                }
                if let Some(score) = ann.score {
                    segment = segment.with_probability(score);
                }
                segments.push(segment);
            }
        }

        Ok(segments)
    }
}
