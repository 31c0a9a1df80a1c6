//! Section-tree backend adapter.
//!
//! Translates the output of a text-flow parser (a tree of titled
//! sections holding paragraphs and tables, with logical page indices but
//! no pixel geometry) into segments. Captions are resolved among a
//! table's sibling nodes with a wide window, and this backend often
//! embeds the caption inside the table's own cell-delimited text, which
//! the `current` pattern picks up. Table segments must pass the quality
//! gate; text sections qualify only when the backend marked at least one
//! entity-bearing sentence in them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::LayoutBackend;
use crate::core::config::{CaptionConfig, CaptionQuery, FLOAT_HEADER_PATTERN, TABLE_CURRENT_PATTERN};
use crate::core::errors::SegResult;
use crate::domain::element::{ElementCategory, PageElement};
use crate::domain::segment::{OriginalRef, Segment, SegmentKind, Segments};
use crate::processors::captions::{CapturedIndices, resolve_caption};
use crate::processors::quality::table_quality_ok;

/// One node in a section's reading order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextFlowNode {
    /// A paragraph of running text.
    Paragraph {
        /// Paragraph text.
        text: String,
        /// 0-based page index.
        page_index: u32,
        /// Number of named-entity-bearing sentences the backend found.
        entity_count: u32,
    },
    /// A recognized table.
    Table {
        /// Cell-delimited text rendering of the table.
        text: String,
        /// HTML rendering of the table.
        html: String,
        /// 0-based page index.
        page_index: u32,
    },
}

impl TextFlowNode {
    fn text(&self) -> &str {
        match self {
            TextFlowNode::Paragraph { text, .. } | TextFlowNode::Table { text, .. } => text,
        }
    }

    fn page_index(&self) -> u32 {
        match self {
            TextFlowNode::Paragraph { page_index, .. } | TextFlowNode::Table { page_index, .. } => {
                *page_index
            }
        }
    }

    fn category(&self) -> ElementCategory {
        match self {
            TextFlowNode::Paragraph { .. } => ElementCategory::Text,
            TextFlowNode::Table { .. } => ElementCategory::Table,
        }
    }
}

/// A titled section of the document outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextFlowSection {
    /// Section title.
    pub title: String,
    /// Outline level (1 = top).
    pub level: u32,
    /// 0-based page index of the section start.
    pub page_index: u32,
    /// HTML rendering of the section, when the backend produced one.
    pub html: Option<String>,
    /// Child nodes in reading order.
    pub nodes: Vec<TextFlowNode>,
}

/// A parsed document: sections in reading order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextFlowDocument {
    /// Sections in reading order.
    pub sections: Vec<TextFlowSection>,
}

/// Adapter for the section-tree backend.
#[derive(Debug, Clone)]
pub struct TextFlowBackend {
    table_query: CaptionQuery,
}

impl TextFlowBackend {
    /// Creates the adapter with the default caption window: five
    /// sibling nodes of look-ahead, a combined "Table"/"Figure" anchor
    /// for header and footer (the resolved caption's leading token then
    /// decides the segment kind), and an embedded-caption pattern for
    /// the table's own text.
    pub fn new() -> SegResult<Self> {
        Self::from_config(&CaptionConfig {
            look_ahead: 5,
            header_pattern: FLOAT_HEADER_PATTERN.to_string(),
            footer_pattern: Some(FLOAT_HEADER_PATTERN.to_string()),
            current_pattern: Some(TABLE_CURRENT_PATTERN.to_string()),
        })
    }

    /// Creates the adapter with caller-supplied caption configuration.
    pub fn from_config(config: &CaptionConfig) -> SegResult<Self> {
        Ok(Self {
            table_query: config.compile()?,
        })
    }
}

impl LayoutBackend for TextFlowBackend {
    type Document = TextFlowDocument;

    fn name(&self) -> &'static str {
        "textflow"
    }

    fn segments(&self, document: &Self::Document) -> SegResult<Segments> {
        let mut segments = Segments::new();
        // Outline stack for parent links: (level, segment id).
        let mut stack: Vec<(u32, Uuid)> = Vec::new();

        for section in &document.sections {
            let elements: Vec<PageElement> = section
                .nodes
                .iter()
                .enumerate()
                .map(|(i, node)| {
                    PageElement::new(i, node.page_index() + 1, node.category(), node.text())
                })
                .collect();

            // One captured-index set per section scan.
            let mut captured = CapturedIndices::new();

            for (i, node) in section.nodes.iter().enumerate() {
                let TextFlowNode::Table {
                    text,
                    html,
                    page_index,
                } = node
                else {
                    continue;
                };
                if html.trim().is_empty() {
                    continue;
                }

                let table_page = *page_index + 1;
                let same_page_paragraph =
                    |e: &PageElement| e.category.is_text() && e.page_number == table_page;

                let (header, footer) = resolve_caption(
                    &elements,
                    Some(i),
                    &self.table_query,
                    Some(&same_page_paragraph),
                    Some(&same_page_paragraph),
                    &mut captured,
                );

                let caption = format!("{header}{footer}");
                let kind = SegmentKind::from_caption(caption.trim()).unwrap_or(SegmentKind::Table);
                let segment = Segment::new(kind, table_page)
                    .with_header(caption)
                    .with_text(text.clone())
                    .with_html(html.trim().to_string())
                    .with_source(self.name())
                    .with_original(OriginalRef::new(node.clone()));

                if !table_quality_ok(&segment) {
                    tracing::debug!(page = table_page, "dropping low-quality table");
                    continue;
                }
                segments.push(segment);
            }

            if section.nodes.is_empty() {
                continue;
            }
            let entity_bearing = section.nodes.iter().any(
                |n| matches!(n, TextFlowNode::Paragraph { entity_count, .. } if *entity_count > 0),
            );
            if !entity_bearing {
                continue;
            }

            let text: String = section
                .nodes
                .iter()
                .filter_map(|n| match n {
                    TextFlowNode::Paragraph { text, .. } => Some(text.replace('\n', " ")),
                    _ => None,
                })
                .collect();

            let mut segment = Segment::new(SegmentKind::Text, section.page_index + 1)
                .with_header(section.title.clone())
                .with_text(text)
                .with_source(self.name())
                .with_level(section.level);
            if let Some(html) = &section.html {
                segment = segment.with_html(html.replace('—', "-").replace('·', "."));
            }

            while stack.last().is_some_and(|(level, _)| *level >= section.level) {
                stack.pop();
            }
            if let Some((_, parent)) = stack.last() {
                segment = segment.with_parent(*parent);
            }
            stack.push((section.level, segment.id));
            segments.push(segment);
        }

        segments.make_headers_unique();
        Ok(segments)
    }
}
