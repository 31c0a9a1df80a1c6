//! Text cleanup helpers for backend output.
//!
//! Markup-producing backends occasionally degenerate into repeating the
//! same token run for an entire page, and decorate captions with
//! markdown emphasis; both get in the way of caption matching.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

static MARKDOWN_SPAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*(.*?)\*\*|__(.*?)__|\*(.*?)\*|~~(.*?)~~|_(.*?)_")
        .unwrap_or_else(|e| panic!("markdown span regex: {e}"))
});

// Repeating units longer than this are not worth scanning for.
const MAX_UNIT_LEN: usize = 32;

/// Removes token runs that repeat consecutively more than `min_repeats`
/// times, a failure mode of autoregressive markup backends. Every
/// occurrence of a detected unit is removed, not just the run.
pub fn collapse_repeated_runs(s: &str, min_unit_len: usize, min_repeats: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut units: Vec<String> = Vec::new();
    let max_unit = MAX_UNIT_LEN.min(chars.len());

    let mut i = 0;
    while i < chars.len() {
        let mut advanced = false;
        for len in min_unit_len.max(1)..=max_unit {
            if i + len * (min_repeats + 1) > chars.len() {
                break;
            }
            let unit = &chars[i..i + len];
            let mut reps = 1;
            while i + (reps + 1) * len <= chars.len() && chars[i + reps * len..i + (reps + 1) * len] == *unit {
                reps += 1;
            }
            if reps > min_repeats {
                units.push(unit.iter().collect());
                i += reps * len;
                advanced = true;
                break;
            }
        }
        if !advanced {
            i += 1;
        }
    }

    let mut out = s.to_string();
    for unit in units.into_iter().unique() {
        tracing::debug!("removing repeated run {:?}", unit);
        out = out.replace(&unit, "");
    }
    out
}

/// Unwraps markdown emphasis spans, keeping their inner text.
pub fn strip_markdown(s: &str) -> String {
    MARKDOWN_SPAN_RE
        .replace_all(s, |caps: &regex::Captures| {
            (1..=5)
                .find_map(|i| caps.get(i))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_degenerate_repetition() {
        let page = format!("Intro text {}end", "na".repeat(40));
        let cleaned = collapse_repeated_runs(&page, 1, 10);
        assert!(!cleaned.contains("nananana"));
        assert!(cleaned.contains("Intro text"));
        assert!(cleaned.contains("end"));
    }

    #[test]
    fn short_runs_are_left_alone() {
        let s = "wait... no";
        assert_eq!(collapse_repeated_runs(s, 1, 10), s);
    }

    #[test]
    fn strips_markdown_emphasis() {
        assert_eq!(strip_markdown("**Table 1.** Sites"), "Table 1. Sites");
        assert_eq!(strip_markdown("a _b_ *c* ~~d~~"), "a b c d");
        assert_eq!(strip_markdown("plain"), "plain");
    }
}
