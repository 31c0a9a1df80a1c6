//! Layout-analysis backend adapters.
//!
//! Upstream backends are external collaborators: each one detects page
//! layout with its own object model, and an adapter translates that
//! native output into [`Segments`] through the shared caption resolver.
//! The core depends only on the [`LayoutBackend`] seam.

pub mod doclayout;
pub mod textflow;

use rayon::prelude::*;

use crate::core::errors::SegResult;
use crate::domain::segment::Segments;

/// A translator from one backend's native document model to segments.
pub trait LayoutBackend {
    /// The backend's native document representation.
    type Document;

    /// Name recorded on every segment this backend produces.
    fn name(&self) -> &'static str;

    /// Enumerates typed segments for one document.
    fn segments(&self, document: &Self::Document) -> SegResult<Segments>;
}

/// Runs a backend over many documents in parallel.
///
/// Documents share no state (the captured-index set lives inside a
/// single document's page scan), so this fans out with rayon; results
/// come back in input order.
pub fn extract_batch<B>(backend: &B, documents: &[B::Document]) -> Vec<SegResult<Segments>>
where
    B: LayoutBackend + Sync,
    B::Document: Sync,
{
    documents
        .par_iter()
        .map(|document| backend.segments(document))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::doclayout::{DocLayoutAnnotation, DocLayoutBackend, DocLayoutPage};
    use super::*;
    use crate::domain::element::ElementCategory;

    fn document(caption: &str) -> Vec<DocLayoutPage> {
        vec![DocLayoutPage {
            width: 1000,
            height: 1400,
            annotations: vec![
                DocLayoutAnnotation {
                    category: ElementCategory::Text,
                    text: caption.to_string(),
                    html: None,
                    score: None,
                    bbox: [100.0, 80.0, 480.0, 100.0],
                    image: None,
                },
                DocLayoutAnnotation {
                    category: ElementCategory::Table,
                    text: "cells".to_string(),
                    html: None,
                    score: None,
                    bbox: [100.0, 110.0, 500.0, 400.0],
                    image: None,
                },
            ],
        }]
    }

    #[test]
    fn batch_results_come_back_in_input_order() {
        let backend = DocLayoutBackend::new().unwrap();
        let documents = vec![
            document("Table 1. First document"),
            document("Table 2. Second document"),
            document("Table 3. Third document"),
        ];

        let results = extract_batch(&backend, &documents);
        assert_eq!(results.len(), 3);
        for (i, result) in results.iter().enumerate() {
            let segments = result.as_ref().unwrap();
            assert_eq!(segments.len(), 1);
            assert!(segments[0].header.starts_with(&format!("Table {}", i + 1)));
        }
    }
}
