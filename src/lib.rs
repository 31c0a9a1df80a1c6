//! # segalign
//!
//! Segment assembly and table alignment for document-layout extraction
//! evaluation.
//!
//! This crate provides:
//! - A backend-agnostic page element model
//! - Header/footer caption resolution with capture exclusivity
//! - Backend adapters that assemble typed segments
//! - Fuzzy caption deduplication and cross-backend merging
//! - A table quality gate
//! - Column harmonization and row reordering between a predicted and a
//!   ground-truth table, ahead of an external structural-similarity
//!   scorer
//!
//! ## Modules
//!
//! * [`core`] - Error handling and caption configuration
//! * [`domain`] - Page elements and segment records
//! * [`backends`] - Layout-backend adapters and the batch driver
//! * [`processors`] - Caption resolution, deduplication, merging, the
//!   quality gate and HTML table parsing
//! * [`alignment`] - The table alignment engine
//! * [`utils`] - Natural-order comparison and text cleanup

pub mod alignment;
pub mod backends;
pub mod core;
pub mod domain;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    // Error handling
    pub use crate::core::{CaptionConfig, CaptionQuery, SegResult, SegmentError};

    // Domain types
    pub use crate::domain::{
        Coordinates, ElementCategory, OriginalRef, PageElement, Segment, SegmentKind, Segments,
        WidthRelation,
    };

    // Backends
    pub use crate::backends::{LayoutBackend, extract_batch};
    pub use crate::backends::doclayout::{DocLayoutAnnotation, DocLayoutBackend, DocLayoutPage};
    pub use crate::backends::textflow::{
        TextFlowBackend, TextFlowDocument, TextFlowNode, TextFlowSection,
    };

    // Processors
    pub use crate::processors::{
        CHUNK_DELIM, CapturedIndices, DEFAULT_SIMILARITY_THRESHOLD, MergedDetection,
        extract_caption_number, longest_superstrings, matrix_from_html, merge_detections,
        resolve_caption, table_quality_ok,
    };

    // Alignment engine
    pub use crate::alignment::{
        Cell, Column, ColumnType, TableMatrix, align_tables, harmonize_columns,
        most_similar_columns, reorder_rows,
    };
}
