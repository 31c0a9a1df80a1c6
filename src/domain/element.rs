//! Backend-agnostic page element model.
//!
//! Every layout-analysis backend reports its detections in a native object
//! model; adapters normalize them into [`PageElement`] values so the
//! caption resolver can reason about "before" and "after" without knowing
//! which backend produced the page. The `index` field carries the
//! backend's reading order and is the only ordering the resolver relies
//! on.

use serde::{Deserialize, Serialize};

/// Category of a detected layout object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementCategory {
    /// Running text (paragraphs, captions, list items).
    Text,
    /// A table region.
    Table,
    /// A figure, chart or image region.
    Figure,
    /// Anything else the backend reports (page furniture, formulas, ...).
    Other,
}

impl ElementCategory {
    /// Returns true for running text.
    pub fn is_text(&self) -> bool {
        matches!(self, ElementCategory::Text)
    }

    /// Returns true for table regions.
    pub fn is_table(&self) -> bool {
        matches!(self, ElementCategory::Table)
    }

    /// Returns true for figure regions.
    pub fn is_figure(&self) -> bool {
        matches!(self, ElementCategory::Figure)
    }
}

/// Width relation tested by [`Coordinates::is_vstacked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthRelation {
    /// Both boxes span approximately the same width.
    Same,
    /// The other box may be narrower than this one.
    Smaller,
    /// The other box must be at least as wide as this one.
    Larger,
    /// Only the left edges need to line up.
    Any,
}

/// Bounding geometry of a layout object, in the backend's native
/// coordinate space.
///
/// The four points are upper-left, upper-right, lower-left, lower-right.
/// `layout_width`/`layout_height` carry the backend's page raster size
/// when it reports one; they scale the alignment tolerance and are needed
/// downstream for pixel-accurate cropping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Corner points: `[[x1, y1], [x2, y1], [x1, y2], [x2, y2]]`.
    pub points: [[f32; 2]; 4],
    /// Width of the layout raster, if the backend reports one.
    pub layout_width: Option<u32>,
    /// Height of the layout raster, if the backend reports one.
    pub layout_height: Option<u32>,
}

impl Coordinates {
    /// Builds the four-corner representation from an axis-aligned rect.
    pub fn from_rect(ulx: f32, uly: f32, lrx: f32, lry: f32) -> Self {
        Self {
            points: [[ulx, uly], [lrx, uly], [ulx, lry], [lrx, lry]],
            layout_width: None,
            layout_height: None,
        }
    }

    /// Attaches the layout raster size.
    pub fn with_layout_size(mut self, width: u32, height: u32) -> Self {
        self.layout_width = Some(width);
        self.layout_height = Some(height);
        self
    }

    /// Checks whether `other` sits in the same vertical column as this
    /// box, i.e. their horizontal extents line up within a tolerance.
    ///
    /// When both boxes report the same layout width the tolerance is
    /// `tol` of that width; otherwise it falls back to 10 pixels. The
    /// `width` relation controls how the right edges are compared: a
    /// table's caption is usually no wider than the table itself, so the
    /// caption filters use [`WidthRelation::Smaller`].
    pub fn is_vstacked(&self, other: &Coordinates, width: WidthRelation, tol: f32) -> bool {
        let tolerance = match (self.layout_width, other.layout_width) {
            (Some(w), Some(ow)) if w == ow => w as f32 * tol,
            _ => 10.0,
        };

        let x1_self = self.points[0][0];
        let x2_self = self.points[1][0];
        let x1_other = other.points[0][0];
        let x2_other = other.points[1][0];

        match width {
            WidthRelation::Smaller => {
                (x1_self - x1_other).abs() <= tolerance && (x2_self + tolerance) > x2_other
            }
            WidthRelation::Larger => {
                (x1_self - x1_other).abs() <= tolerance && (x2_self + tolerance) <= x2_other
            }
            WidthRelation::Same => {
                (x1_self - x1_other).abs() <= tolerance && (x2_self - x2_other).abs() <= tolerance
            }
            WidthRelation::Any => (x1_self - x1_other).abs() <= tolerance,
        }
    }
}

/// One detected layout object, normalized across backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageElement {
    /// Position in the backend's reading order, unique within a document.
    pub index: usize,
    /// 1-based page number.
    pub page_number: u32,
    /// Detected category.
    pub category: ElementCategory,
    /// Raw extracted text; may be empty.
    pub text: String,
    /// Bounding geometry, when the backend reports one.
    pub coords: Option<Coordinates>,
}

impl PageElement {
    /// Creates a new page element.
    pub fn new(
        index: usize,
        page_number: u32,
        category: ElementCategory,
        text: impl Into<String>,
    ) -> Self {
        Self {
            index,
            page_number,
            category,
            text: text.into(),
            coords: None,
        }
    }

    /// Attaches bounding geometry.
    pub fn with_coords(mut self, coords: Coordinates) -> Self {
        self.coords = Some(coords);
        self
    }
}
