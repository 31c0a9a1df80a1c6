//! Fuzzy deduplication of overlapping caption candidates.
//!
//! Multiple detections of the same region tend to yield near-duplicate
//! caption strings ("Table 3. Long caption text" next to "Long caption
//! text"). [`longest_superstrings`] collapses such a set to the minimal
//! covering set of maximal strings, using a partial-containment ratio:
//! the best normalized edit-distance similarity of the shorter string
//! against any equal-length window of the longer.

use strsim::normalized_levenshtein;

/// Default partial-containment threshold, in percent.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 90.0;

/// Best fuzzy-containment score of the shorter of `a`/`b` inside the
/// longer, as a percentage in `0.0..=100.0`.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (needle, haystack) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    if needle.is_empty() {
        return if haystack.is_empty() { 100.0 } else { 0.0 };
    }

    let needle: String = needle.iter().collect();
    let mut best = 0.0f64;
    for window in haystack.windows(needle.chars().count()) {
        let window: String = window.iter().collect();
        let score = normalized_levenshtein(&needle, &window) * 100.0;
        if score > best {
            best = score;
        }
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// Collapses `candidates` into a minimal set of maximal, mutually
/// non-overlapping strings.
///
/// Candidates are processed longest-first (ties keep the given order). A
/// candidate that is a fuzzy substring of an already-accepted string is
/// discarded; otherwise it is accepted and evicts any accepted string
/// that is itself a fuzzy substring of the newcomer.
pub fn longest_superstrings(
    candidates: impl IntoIterator<Item = String>,
    threshold: f64,
) -> Vec<String> {
    let mut ordered: Vec<String> = candidates.into_iter().collect();
    ordered.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut superstrings: Vec<String> = Vec::new();
    for candidate in ordered {
        let is_substring = superstrings
            .iter()
            .any(|sup| partial_ratio(&candidate, sup) > threshold);
        if is_substring {
            continue;
        }

        let mut next = vec![candidate.clone()];
        for sup in &superstrings {
            if partial_ratio(sup, &candidate) <= threshold {
                next.push(sup.clone());
            }
        }
        superstrings = next;
    }

    superstrings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_ratio_detects_containment() {
        assert!(partial_ratio("caption text", "Table 3. Long caption text") > 90.0);
        assert!(partial_ratio("unrelated words", "Table 3. Long caption text") < 60.0);
        assert_eq!(partial_ratio("", ""), 100.0);
        assert_eq!(partial_ratio("", "anything"), 0.0);
    }

    #[test]
    fn partial_ratio_is_symmetric_in_argument_order() {
        let a = "Long caption text";
        let b = "Table 3. Long caption text";
        assert_eq!(partial_ratio(a, b), partial_ratio(b, a));
    }

    #[test]
    fn near_duplicate_collapses_to_the_longer_string() {
        let result = longest_superstrings(
            [
                "Table 3. Long caption text".to_string(),
                "Long caption text".to_string(),
            ],
            DEFAULT_SIMILARITY_THRESHOLD,
        );
        assert_eq!(result, vec!["Table 3. Long caption text".to_string()]);
    }

    #[test]
    fn unrelated_captions_all_survive() {
        let mut result = longest_superstrings(
            [
                "Table 1. Mosquito counts per site".to_string(),
                "Figure 2. Rainfall by month".to_string(),
            ],
            DEFAULT_SIMILARITY_THRESHOLD,
        );
        result.sort();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn shorter_subset_never_survives_regardless_of_input_order() {
        // The length sort puts the superset first even when the subset
        // was seen first.
        let result = longest_superstrings(
            [
                "Species composition".to_string(),
                "Table 2. Species composition of indoor collections".to_string(),
            ],
            DEFAULT_SIMILARITY_THRESHOLD,
        );
        assert_eq!(
            result,
            vec!["Table 2. Species composition of indoor collections".to_string()]
        );
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let result = longest_superstrings(Vec::<String>::new(), DEFAULT_SIMILARITY_THRESHOLD);
        assert!(result.is_empty());
    }
}
