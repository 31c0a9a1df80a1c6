//! Processing passes over backend output: caption resolution, fuzzy
//! caption deduplication, cross-backend merging, HTML table parsing and
//! the table quality gate.

pub mod captions;
pub mod dedup;
pub mod html_table;
pub mod merge;
pub mod quality;

pub use captions::{CapturedIndices, extract_caption_number, resolve_caption};
pub use dedup::{DEFAULT_SIMILARITY_THRESHOLD, longest_superstrings, partial_ratio};
pub use html_table::matrix_from_html;
pub use merge::{CHUNK_DELIM, MergedDetection, merge_detections};
pub use quality::table_quality_ok;
