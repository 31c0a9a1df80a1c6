//! Column harmonization, column-similarity ranking and row reordering.
//!
//! A predicted table and a ground-truth table arrive with no guaranteed
//! column or row order. Before a structural-similarity scorer can compare
//! them cell by cell, columns are reconciled (types coerced, shared
//! columns first in truth order) and rows are re-sorted by the columns
//! whose value sets overlap the most. All three operations are
//! best-effort: inputs lacking the required structure pass through
//! unchanged, lowering the downstream score instead of crashing the
//! pipeline.

use std::cmp::Ordering;

use itertools::Itertools;

use crate::alignment::matrix::{Cell, Column, ColumnType, TableMatrix};
use crate::utils::natsort::natural_cmp;

// Sort sentinels for missing values; the numeric one sorts first, the
// textual one after ordinary words.
const NUMERIC_FILL: f64 = -999_999.0;
const TEXT_FILL: &str = "zzz";

/// Harmonizes the predicted table's columns against the truth table.
///
/// List-valued cells are collapsed to comma-joined text in both tables so
/// equality comparisons are well-defined. Predicted columns sharing a
/// name with a truth column are coerced to the truth column's type where
/// possible (a column converts only when every non-missing value does;
/// failures leave it untouched). Predicted columns are then reordered:
/// shared columns first, in truth order, predicted-only columns appended
/// in name order. Truth's column order is never changed. Either table
/// having zero columns returns both unchanged.
pub fn harmonize_columns(truth: &TableMatrix, pred: &TableMatrix) -> (TableMatrix, TableMatrix) {
    if truth.column_count() == 0 || pred.column_count() == 0 {
        return (truth.clone(), pred.clone());
    }

    let mut truth = truth.clone();
    let mut pred = pred.clone();
    collapse_lists(&mut truth);
    collapse_lists(&mut pred);

    for column in pred.columns_mut() {
        if let Some(target) = truth.column(&column.name) {
            coerce_column(column, target.column_type());
        }
    }

    let shared = truth
        .column_names()
        .filter(|n| pred.has_column(n))
        .map(str::to_string);
    let extras = pred
        .column_names()
        .filter(|n| !truth.has_column(n))
        .map(str::to_string)
        .sorted();
    let order: Vec<String> = shared.chain(extras).collect();
    let pred = pred.select(&order);

    (truth, pred)
}

fn collapse_lists(table: &mut TableMatrix) {
    for column in table.columns_mut() {
        for cell in &mut column.values {
            if matches!(cell, Cell::List(_)) {
                *cell = Cell::Text(cell.display());
            }
        }
    }
}

fn coerce_column(column: &mut Column, target: ColumnType) {
    match (column.column_type(), target) {
        (ColumnType::Text, ColumnType::Number) => {
            let parsed: Option<Vec<Cell>> = column
                .values
                .iter()
                .map(|cell| match cell {
                    Cell::Null => Some(Cell::Null),
                    Cell::Number(v) => Some(Cell::Number(*v)),
                    Cell::Text(s) => s
                        .trim()
                        .parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .map(Cell::Number),
                    Cell::List(_) => None,
                })
                .collect();
            if let Some(values) = parsed {
                column.values = values;
            }
        }
        (ColumnType::Number, ColumnType::Text) => {
            for cell in &mut column.values {
                if let Cell::Number(_) = cell {
                    *cell = Cell::Text(cell.display());
                }
            }
        }
        _ => {}
    }
}

/// Ranks the columns shared by both tables by how much their value sets
/// overlap, descending.
///
/// Columns that are constant (at most one distinct non-missing value) in
/// either table carry no discriminating signal and are excluded. A
/// shared column whose inferred types differ is still ranked but logs a
/// warning. Ties keep the truth table's column encounter order. Returns
/// an empty list when no shared, non-constant column exists.
pub fn most_similar_columns(pred: &TableMatrix, truth: &TableMatrix) -> Vec<String> {
    let mut scored: Vec<(String, usize)> = Vec::new();
    for truth_col in truth.columns() {
        let Some(pred_col) = pred.column(&truth_col.name) else {
            continue;
        };
        if truth_col.distinct_count() <= 1 || pred_col.distinct_count() <= 1 {
            continue;
        }
        if truth_col.column_type() != pred_col.column_type() {
            tracing::warn!(
                column = %truth_col.name,
                "column has different types: {:?} and {:?}",
                truth_col.column_type(),
                pred_col.column_type()
            );
        }
        let overlap = truth_col
            .value_set()
            .intersection(&pred_col.value_set())
            .count();
        scored.push((truth_col.name.clone(), overlap));
    }

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(name, _)| name).collect()
}

/// Reorders both tables' rows by the most similar shared columns, in
/// natural order, so positional comparison downstream is meaningful.
///
/// `priority` columns (when given) are restricted to columns present in
/// both tables, ranked among themselves, and prepended to the general
/// ranking. When no sort column is found both tables return unchanged
/// and alignment falls back to original order, which the caller must
/// tolerate.
pub fn reorder_rows(
    truth: &TableMatrix,
    pred: &TableMatrix,
    priority: Option<&[&str]>,
) -> (TableMatrix, TableMatrix) {
    let mut sort_columns: Vec<String> = Vec::new();

    if let Some(priority) = priority {
        if !priority.is_empty() {
            let restricted: Vec<String> = truth
                .column_names()
                .filter(|n| pred.has_column(n) && priority.contains(n))
                .map(str::to_string)
                .collect();
            if !restricted.is_empty() {
                sort_columns.extend(most_similar_columns(
                    &pred.select(&restricted),
                    &truth.select(&restricted),
                ));
            }
        }
    }

    sort_columns.extend(most_similar_columns(pred, truth));

    if sort_columns.is_empty() {
        return (truth.clone(), pred.clone());
    }
    tracing::debug!(?sort_columns, "reordering rows");

    (
        sort_rows(truth, &sort_columns),
        sort_rows(pred, &sort_columns),
    )
}

/// Harmonizes columns and reorders rows in one step; the returned pair
/// is what gets handed to the external structural-similarity scorer.
pub fn align_tables(
    truth: &TableMatrix,
    pred: &TableMatrix,
    priority: Option<&[&str]>,
) -> (TableMatrix, TableMatrix) {
    let (truth, pred) = harmonize_columns(truth, pred);
    reorder_rows(&truth, &pred, priority)
}

fn sort_rows(table: &TableMatrix, keys: &[String]) -> TableMatrix {
    let key_columns: Vec<&Column> = keys.iter().filter_map(|k| table.column(k)).collect();
    let mut order: Vec<usize> = (0..table.row_count()).collect();
    order.sort_by(|&a, &b| {
        for column in &key_columns {
            let ord = compare_cells(column, &column.values[a], &column.values[b]);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    table.reordered(&order)
}

fn compare_cells(column: &Column, a: &Cell, b: &Cell) -> Ordering {
    match column.column_type() {
        ColumnType::Number => {
            let fa = a.as_number().unwrap_or(NUMERIC_FILL);
            let fb = b.as_number().unwrap_or(NUMERIC_FILL);
            fa.partial_cmp(&fb).unwrap_or(Ordering::Equal)
        }
        ColumnType::Text => {
            let fill = |cell: &Cell| {
                if cell.is_null() {
                    TEXT_FILL.to_string()
                } else {
                    cell.display()
                }
            };
            natural_cmp(&fill(a), &fill(b))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(columns: &[(&str, Vec<Cell>)]) -> TableMatrix {
        TableMatrix::from_columns(
            columns
                .iter()
                .map(|(name, values)| Column::new(*name, values.clone()))
                .collect(),
        )
        .unwrap()
    }

    fn names(table: &TableMatrix) -> Vec<&str> {
        table.column_names().collect()
    }

    #[test]
    fn harmonize_is_identity_on_identical_tables() {
        let truth = matrix(&[
            ("a", vec![1.into(), 2.into()]),
            ("b", vec![3.into(), 4.into()]),
        ]);
        let pred = truth.clone();
        let (t, p) = harmonize_columns(&truth, &pred);
        assert_eq!(t, truth);
        assert_eq!(p, pred);
    }

    #[test]
    fn harmonize_reorders_predicted_columns_to_truth_order() {
        let truth = matrix(&[
            ("a", vec![1.into(), 2.into()]),
            ("b", vec![3.into(), 4.into()]),
        ]);
        let pred = matrix(&[
            ("b", vec![3.into(), 4.into()]),
            ("z", vec!["extra".into(), "extra2".into()]),
            ("a", vec![1.into(), 2.into()]),
            ("c", vec!["x".into(), "y".into()]),
        ]);
        let (t, p) = harmonize_columns(&truth, &pred);
        assert_eq!(names(&t), vec!["a", "b"]);
        // Shared columns in truth order, extras appended in name order.
        assert_eq!(names(&p), vec!["a", "b", "c", "z"]);
    }

    #[test]
    fn harmonize_coerces_predicted_text_to_truth_numbers() {
        let truth = matrix(&[("a", vec![1.into(), 2.into()])]);
        let pred = matrix(&[("a", vec!["1".into(), "2".into()])]);
        let (t, p) = harmonize_columns(&truth, &pred);
        assert_eq!(p.column("a").unwrap().values[0], Cell::Number(1.0));
        assert_eq!(
            most_similar_columns(&p, &t),
            vec!["a".to_string()],
            "coerced values overlap with truth"
        );
    }

    #[test]
    fn harmonize_tolerates_uncoercible_columns() {
        let truth = matrix(&[("a", vec![1.into(), 2.into()])]);
        let pred = matrix(&[("a", vec!["1".into(), "two".into()])]);
        let (_, p) = harmonize_columns(&truth, &pred);
        // "two" does not parse; the whole column stays textual.
        assert_eq!(p.column("a").unwrap().values[0], Cell::Text("1".into()));
    }

    #[test]
    fn harmonize_collapses_list_cells() {
        let truth = matrix(&[("a", vec!["x,y".into(), "z".into()])]);
        let pred = matrix(&[(
            "a",
            vec![Cell::List(vec!["x".into(), "y".into()]), "z".into()],
        )]);
        let (t, p) = harmonize_columns(&truth, &pred);
        assert_eq!(p.column("a").unwrap().values[0], Cell::Text("x,y".into()));
        assert_eq!(most_similar_columns(&p, &t), vec!["a".to_string()]);
    }

    #[test]
    fn harmonize_passes_zero_column_tables_through() {
        let truth = TableMatrix::new();
        let pred = matrix(&[("a", vec![1.into()])]);
        let (t, p) = harmonize_columns(&truth, &pred);
        assert_eq!(t, truth);
        assert_eq!(p, pred);
        let (t2, p2) = reorder_rows(&truth, &pred, None);
        assert_eq!(t2, truth);
        assert_eq!(p2, pred);
    }

    #[test]
    fn ranking_is_deterministic_and_tie_broken_by_truth_order() {
        let truth = matrix(&[
            ("a", vec![1.into(), 2.into()]),
            ("b", vec![3.into(), 4.into()]),
        ]);
        let pred = truth.clone();
        assert_eq!(
            most_similar_columns(&pred, &truth),
            vec!["a".to_string(), "b".to_string()]
        );

        let pred = matrix(&[
            ("a", vec![1.into(), 2.into()]),
            ("c", vec![3.into(), 4.into()]),
        ]);
        assert_eq!(most_similar_columns(&pred, &truth), vec!["a".to_string()]);
    }

    #[test]
    fn constant_columns_are_excluded_from_ranking() {
        let truth = matrix(&[
            ("a", vec![1.into(), 1.into()]),
            ("b", vec![3.into(), 4.into()]),
        ]);
        let pred = matrix(&[
            ("a", vec![1.into(), 1.into()]),
            ("b", vec![4.into(), 3.into()]),
        ]);
        assert_eq!(most_similar_columns(&pred, &truth), vec!["b".to_string()]);
    }

    #[test]
    fn ranking_prefers_larger_overlap() {
        let truth = matrix(&[
            ("a", vec![1.into(), 2.into(), 3.into()]),
            ("b", vec![10.into(), 20.into(), 30.into()]),
        ]);
        let pred = matrix(&[
            ("a", vec![1.into(), 2.into(), 99.into()]),
            ("b", vec![10.into(), 20.into(), 30.into()]),
        ]);
        assert_eq!(
            most_similar_columns(&pred, &truth),
            vec!["b".to_string(), "a".to_string()]
        );
    }

    #[test]
    fn reorder_sorts_both_tables_by_natural_order() {
        let truth = matrix(&[
            ("a", vec![2.into(), 1.into()]),
            ("b", vec!["second".into(), "first".into()]),
        ]);
        let pred = matrix(&[
            ("a", vec![1.into(), 2.into()]),
            ("b", vec!["first".into(), "second".into()]),
        ]);
        let (t, p) = reorder_rows(&truth, &pred, None);
        assert_eq!(
            t.column("a").unwrap().values,
            vec![Cell::Number(1.0), Cell::Number(2.0)]
        );
        assert_eq!(t.column("a").unwrap().values, p.column("a").unwrap().values);
        assert_eq!(t.column("b").unwrap().values, p.column("b").unwrap().values);
    }

    #[test]
    fn reorder_uses_natural_order_for_numbered_labels() {
        let truth = matrix(&[(
            "site",
            vec!["site 10".into(), "site 9".into(), "site 1".into()],
        )]);
        let pred = matrix(&[(
            "site",
            vec!["site 9".into(), "site 1".into(), "site 10".into()],
        )]);
        let (t, p) = reorder_rows(&truth, &pred, None);
        let expected = vec![
            Cell::Text("site 1".into()),
            Cell::Text("site 9".into()),
            Cell::Text("site 10".into()),
        ];
        assert_eq!(t.column("site").unwrap().values, expected);
        assert_eq!(p.column("site").unwrap().values, expected);
    }

    #[test]
    fn missing_values_use_sort_sentinels() {
        let truth = matrix(&[("a", vec![Cell::Null, 2.into(), 1.into()])]);
        let pred = matrix(&[("a", vec![1.into(), Cell::Null, 2.into()])]);
        let (t, _) = reorder_rows(&truth, &pred, None);
        // Numeric fill is very small: missing rows sort first.
        assert_eq!(
            t.column("a").unwrap().values,
            vec![Cell::Null, Cell::Number(1.0), Cell::Number(2.0)]
        );

        let truth = matrix(&[("s", vec![Cell::Null, "b".into(), "a".into()])]);
        let pred = matrix(&[("s", vec!["a".into(), "b".into(), Cell::Null])]);
        let (t, _) = reorder_rows(&truth, &pred, None);
        // Text fill is high-sorting: missing rows sort after words.
        assert_eq!(
            t.column("s").unwrap().values,
            vec![Cell::Text("a".into()), Cell::Text("b".into()), Cell::Null]
        );
    }

    #[test]
    fn priority_columns_lead_the_sort_key() {
        let truth = matrix(&[
            ("id", vec![2.into(), 1.into()]),
            ("v", vec![9.into(), 8.into()]),
        ]);
        let pred = matrix(&[
            ("id", vec![2.into(), 1.into()]),
            ("v", vec![9.into(), 8.into()]),
        ]);
        let (t, p) = reorder_rows(&truth, &pred, Some(&["id"]));
        assert_eq!(
            t.column("id").unwrap().values,
            vec![Cell::Number(1.0), Cell::Number(2.0)]
        );
        assert_eq!(t, p);
    }

    #[test]
    fn no_shared_structure_degrades_to_identity_order() {
        let truth = matrix(&[("a", vec![2.into(), 1.into()])]);
        let pred = matrix(&[("z", vec!["x".into(), "y".into()])]);
        let (t, p) = reorder_rows(&truth, &pred, None);
        assert_eq!(t, truth);
        assert_eq!(p, pred);
    }

    #[test]
    fn align_tables_composes_harmonize_and_reorder() {
        let truth = matrix(&[
            ("a", vec![2.into(), 1.into()]),
            ("b", vec!["y".into(), "x".into()]),
        ]);
        let pred = matrix(&[
            ("b", vec!["x".into(), "y".into()]),
            ("a", vec!["1".into(), "2".into()]),
        ]);
        let (t, p) = align_tables(&truth, &pred, None);
        assert_eq!(names(&t), names(&p));
        assert_eq!(
            t.column("a").unwrap().values,
            p.column("a").unwrap().values
        );
    }
}
