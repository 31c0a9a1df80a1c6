//! Table extraction quality gate.
//!
//! A detected table is only worth keeping when, after removing fully
//! missing rows and columns, it still has at least two rows and two
//! columns. Parse failures reject the segment rather than erroring; the
//! caller simply drops it from the pipeline.

use crate::domain::segment::Segment;
use crate::processors::html_table::matrix_from_html;

/// Returns whether a table segment's content parses into a table of
/// useful shape.
pub fn table_quality_ok(segment: &Segment) -> bool {
    let Some(html) = segment.html.as_deref() else {
        return false;
    };
    let Some(mut matrix) = matrix_from_html(html) else {
        return false;
    };

    matrix.replace_empty_with_null();
    let reduced = matrix.drop_missing();
    reduced.row_count() > 1 && reduced.column_count() > 1
}
