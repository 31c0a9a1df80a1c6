//! Domain types: page elements and segments.

pub mod element;
pub mod segment;

pub use element::{Coordinates, ElementCategory, PageElement, WidthRelation};
pub use segment::{OriginalRef, Segment, SegmentKind, Segments};
