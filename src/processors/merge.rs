//! Cross-backend merge of table/figure detections.
//!
//! Independent backends each produce their own [`Segments`] for a
//! document, usually finding the same tables in the same order but with
//! slightly different captions. The merge walks all sources in parallel
//! with one pointer each, groups the detections that land on the same
//! page, and collapses their caption variants through the fuzzy
//! deduplicator.

use itertools::Itertools;

use crate::domain::segment::{Segment, SegmentKind, Segments};
use crate::processors::dedup::longest_superstrings;

/// Delimiter between caption variants in a combined header.
pub const CHUNK_DELIM: &str = "\n\n---\n";

/// One logical table/figure with the contributing detection from every
/// backend that found it.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedDetection {
    /// Combined caption: the minimal covering set of variants, joined
    /// with [`CHUNK_DELIM`].
    pub header: String,
    /// Kind reported by the first contributing detection.
    pub kind: SegmentKind,
    /// 1-based page number the detections agree on.
    pub page_number: u32,
    /// First available caption number among the detections.
    pub number: Option<u32>,
    /// First available rendered crop path.
    pub image: Option<String>,
    /// Highest confidence among the detections.
    pub probability: Option<f32>,
    /// The contributing detections, as (backend name, segment).
    pub extractions: Vec<(String, Segment)>,
}

/// Merges per-backend segment collections into aligned detections.
///
/// Each round inspects every source's current segment, keeps the ones on
/// the earliest (page, caption-number) position, and advances only the
/// pointers that contributed, so a backend that missed a table simply
/// re-offers its segment in the next round.
pub fn merge_detections(sources: &[(&str, &Segments)], threshold: f64) -> Vec<MergedDetection> {
    let sources: Vec<(&str, &Segments)> = sources
        .iter()
        .filter(|(_, segments)| !segments.is_empty())
        .copied()
        .collect();
    let mut pointers = vec![0usize; sources.len()];
    let mut merged = Vec::new();

    while pointers
        .iter()
        .zip(&sources)
        .any(|(&p, (_, segments))| p < segments.len())
    {
        let mut current: Vec<(usize, &str, &Segment)> = Vec::new();
        for (slot, &(name, segments)) in sources.iter().enumerate() {
            if pointers[slot] < segments.len() {
                current.push((slot, name, &segments[pointers[slot]]));
            }
        }
        if current.is_empty() {
            break;
        }

        current.sort_by_key(|(_, _, segment)| {
            (
                segment.page_number,
                segment.number().unwrap_or(u32::MAX),
            )
        });
        let current_page = current[0].2.page_number;
        let contributing: Vec<(usize, &str, &Segment)> = current
            .into_iter()
            .filter(|(_, _, segment)| segment.page_number == current_page)
            .collect();

        let headers: Vec<String> = contributing
            .iter()
            .map(|(_, _, segment)| segment.header.trim().to_string())
            .filter(|h| !h.is_empty())
            .unique()
            .collect();
        let header = longest_superstrings(headers, threshold).join(CHUNK_DELIM);

        merged.push(MergedDetection {
            header,
            kind: contributing[0].2.kind,
            page_number: current_page,
            number: contributing.iter().find_map(|(_, _, s)| s.number()),
            image: contributing
                .iter()
                .find_map(|(_, _, s)| s.image.clone()),
            probability: contributing
                .iter()
                .filter_map(|(_, _, s)| s.probability)
                .reduce(f32::max),
            extractions: contributing
                .iter()
                .map(|(_, name, segment)| (name.to_string(), (*segment).clone()))
                .collect(),
        });

        for (slot, _, _) in contributing {
            pointers[slot] += 1;
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::dedup::DEFAULT_SIMILARITY_THRESHOLD;

    fn table(page: u32, header: &str, probability: Option<f32>) -> Segment {
        let mut segment = Segment::new(SegmentKind::Table, page).with_header(header);
        if let Some(p) = probability {
            segment = segment.with_probability(p);
        }
        segment
    }

    fn collection(segments: Vec<Segment>) -> Segments {
        segments.into_iter().collect()
    }

    #[test]
    fn matching_detections_merge_with_combined_header() {
        let a = collection(vec![table(1, "Table 1. Species counts by site", Some(0.9))]);
        let b = collection(vec![table(1, "Species counts by site", None)]);

        let merged = merge_detections(
            &[("doclayout", &a), ("textflow", &b)],
            DEFAULT_SIMILARITY_THRESHOLD,
        );
        assert_eq!(merged.len(), 1);
        let detection = &merged[0];
        assert_eq!(detection.header, "Table 1. Species counts by site");
        assert_eq!(detection.number, Some(1));
        assert_eq!(detection.probability, Some(0.9));
        assert_eq!(detection.extractions.len(), 2);
    }

    #[test]
    fn dissimilar_captions_are_kept_with_delimiter() {
        let a = collection(vec![table(1, "Table 1. Rainfall by month", None)]);
        let b = collection(vec![table(1, "Entirely different words here", None)]);

        let merged = merge_detections(
            &[("doclayout", &a), ("textflow", &b)],
            DEFAULT_SIMILARITY_THRESHOLD,
        );
        assert_eq!(merged.len(), 1);
        assert!(merged[0].header.contains(CHUNK_DELIM));
    }

    #[test]
    fn backend_missing_a_page_reoffers_its_segment() {
        // Source a found tables on pages 1 and 2; source b only on page 2.
        let a = collection(vec![
            table(1, "Table 1. Only in a", None),
            table(2, "Table 2. In both", None),
        ]);
        let b = collection(vec![table(2, "Table 2. In both sources", None)]);

        let merged = merge_detections(
            &[("doclayout", &a), ("textflow", &b)],
            DEFAULT_SIMILARITY_THRESHOLD,
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].page_number, 1);
        assert_eq!(merged[0].extractions.len(), 1);
        assert_eq!(merged[1].page_number, 2);
        assert_eq!(merged[1].extractions.len(), 2);
    }

    #[test]
    fn empty_sources_are_ignored() {
        let empty = Segments::new();
        let a = collection(vec![table(1, "Table 1. Alone", None)]);
        let merged = merge_detections(
            &[("doclayout", &a), ("textflow", &empty)],
            DEFAULT_SIMILARITY_THRESHOLD,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].extractions.len(), 1);
        assert!(merge_detections(&[], DEFAULT_SIMILARITY_THRESHOLD).is_empty());
    }
}
