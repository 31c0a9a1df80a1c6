//! Rectangular tabular dataset consumed by the alignment engine.
//!
//! A [`TableMatrix`] is an ordered list of named columns, each the same
//! length. It represents either the predicted or the ground-truth
//! extraction of one logical table; the alignment engine's contract is to
//! establish a column and row correspondence between two of them. No
//! invariant is placed on column or row order on input.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::errors::{SegResult, SegmentError};

/// One scalar (or collapsed list) value in a table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// Missing value.
    Null,
    /// Numeric value; integers and floats are not distinguished.
    Number(f64),
    /// Free-text value.
    Text(String),
    /// List-valued cell, as some extractors emit; collapsed to a
    /// comma-joined [`Cell::Text`] during harmonization.
    List(Vec<Cell>),
}

impl Cell {
    /// Whether the cell is missing.
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// The numeric value, when the cell holds a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Canonical display form. Integral numbers render without a decimal
    /// point, so `3.0` and `3` read the same.
    pub fn display(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Number(v) => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    format!("{}", *v as i64)
                } else {
                    format!("{}", v)
                }
            }
            Cell::Text(s) => s.clone(),
            Cell::List(items) => items
                .iter()
                .map(Cell::display)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Hashable identity used for value-set comparisons. `None` for
    /// missing values, which never participate in overlap counting.
    /// Numbers compare numerically, so `1` and `1.0` share a key.
    pub fn key(&self) -> Option<CellKey> {
        match self {
            Cell::Null => None,
            Cell::Number(v) => {
                if v.is_nan() {
                    None
                } else {
                    let normalized = if *v == 0.0 { 0.0 } else { *v };
                    Some(CellKey::Number(normalized.to_bits()))
                }
            }
            Cell::Text(s) => Some(CellKey::Text(s.clone())),
            Cell::List(_) => Some(CellKey::Text(self.display())),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Number(v as f64)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

/// Hashable identity of a non-missing cell value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellKey {
    /// Bit pattern of the normalized numeric value.
    Number(u64),
    /// Text content.
    Text(String),
}

/// Declared type of a column, inferred from its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// All non-missing values are numbers.
    Number,
    /// At least one non-missing value is text (or list-valued).
    Text,
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Cell values, one per row.
    pub values: Vec<Cell>,
}

impl Column {
    /// Creates a column.
    pub fn new(name: impl Into<String>, values: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Inferred type: numeric unless some non-missing value is textual.
    pub fn column_type(&self) -> ColumnType {
        let any_text = self
            .values
            .iter()
            .any(|c| matches!(c, Cell::Text(_) | Cell::List(_)));
        if any_text {
            ColumnType::Text
        } else {
            ColumnType::Number
        }
    }

    /// Number of distinct non-missing values.
    pub fn distinct_count(&self) -> usize {
        self.values
            .iter()
            .filter_map(Cell::key)
            .collect::<HashSet<_>>()
            .len()
    }

    /// The set of non-missing value identities.
    pub fn value_set(&self) -> HashSet<CellKey> {
        self.values.iter().filter_map(Cell::key).collect()
    }
}

/// A rectangular tabular dataset: ordered named columns of equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableMatrix {
    columns: Vec<Column>,
}

impl TableMatrix {
    /// Creates an empty matrix (zero columns, zero rows).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a matrix from columns, validating that they share one
    /// length.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::InvalidInput`] when column lengths differ.
    pub fn from_columns(columns: Vec<Column>) -> SegResult<Self> {
        if let Some(first) = columns.first() {
            let rows = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
                return Err(SegmentError::invalid_input(format!(
                    "column '{}' has {} rows, expected {}",
                    bad.name,
                    bad.len(),
                    rows
                )));
            }
        }
        Ok(Self { columns })
    }

    pub(crate) fn push_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// The columns, in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut Vec<Column> {
        &mut self.columns
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Looks a column up by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// A new matrix holding the named columns (those that exist), in the
    /// given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> TableMatrix {
        let columns = names
            .iter()
            .filter_map(|n| self.column(n.as_ref()).cloned())
            .collect();
        Self { columns }
    }

    /// Replaces empty-string cells with an explicit missing marker.
    pub fn replace_empty_with_null(&mut self) {
        for column in &mut self.columns {
            for cell in &mut column.values {
                if matches!(cell, Cell::Text(s) if s.is_empty()) {
                    *cell = Cell::Null;
                }
            }
        }
    }

    /// Drops rows that are entirely missing, then columns that are
    /// entirely missing in the remaining rows.
    pub fn drop_missing(&self) -> TableMatrix {
        let keep_rows: Vec<usize> = (0..self.row_count())
            .filter(|&r| self.columns.iter().any(|c| !c.values[r].is_null()))
            .collect();

        let columns = self
            .columns
            .iter()
            .filter(|c| keep_rows.iter().any(|&r| !c.values[r].is_null()))
            .map(|c| {
                Column::new(
                    c.name.clone(),
                    keep_rows.iter().map(|&r| c.values[r].clone()).collect(),
                )
            })
            .collect();

        Self { columns }
    }

    /// A new matrix with rows permuted into `order`.
    pub fn reordered(&self, order: &[usize]) -> TableMatrix {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                Column::new(
                    c.name.clone(),
                    order.iter().map(|&r| c.values[r].clone()).collect(),
                )
            })
            .collect();
        Self { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_column_lengths_are_rejected() {
        let err = TableMatrix::from_columns(vec![
            Column::new("a", vec![1.into(), 2.into()]),
            Column::new("b", vec![3.into()]),
        ])
        .unwrap_err();
        assert!(matches!(err, SegmentError::InvalidInput { .. }));
    }

    #[test]
    fn numeric_keys_unify_integers_and_floats() {
        assert_eq!(Cell::Number(1.0).key(), Cell::from(1i64).key());
        assert_ne!(Cell::Number(1.0).key(), Cell::from("1").key());
        assert_eq!(Cell::Null.key(), None);
        assert_eq!(Cell::Number(f64::NAN).key(), None);
        assert_eq!(Cell::Number(0.0).key(), Cell::Number(-0.0).key());
    }

    #[test]
    fn display_renders_integral_numbers_without_decimals() {
        assert_eq!(Cell::Number(3.0).display(), "3");
        assert_eq!(Cell::Number(3.5).display(), "3.5");
        assert_eq!(
            Cell::List(vec![1.into(), "x".into()]).display(),
            "1,x"
        );
    }

    #[test]
    fn drop_missing_removes_empty_rows_then_columns() {
        // 2x2 with one fully-empty row and one fully-empty column
        // reduces to 1x1.
        let matrix = TableMatrix::from_columns(vec![
            Column::new("a", vec![Cell::from("x"), Cell::Null]),
            Column::new("b", vec![Cell::Null, Cell::Null]),
        ])
        .unwrap();
        let reduced = matrix.drop_missing();
        assert_eq!(reduced.row_count(), 1);
        assert_eq!(reduced.column_count(), 1);
    }

    #[test]
    fn distinct_count_ignores_missing_values() {
        let column = Column::new(
            "a",
            vec![Cell::Null, 1.into(), Cell::Number(1.0), 2.into()],
        );
        assert_eq!(column.distinct_count(), 2);
    }

    #[test]
    fn column_type_inference() {
        assert_eq!(
            Column::new("n", vec![1.into(), Cell::Null]).column_type(),
            ColumnType::Number
        );
        assert_eq!(
            Column::new("t", vec![1.into(), "x".into()]).column_type(),
            ColumnType::Text
        );
    }
}
