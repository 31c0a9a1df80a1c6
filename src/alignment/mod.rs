//! Table alignment engine.
//!
//! Harmonizes columns and reorders rows between a predicted and a
//! ground-truth [`matrix::TableMatrix`] so that a positionally-comparing
//! structural-similarity scorer downstream receives matrices with a
//! deterministic column ordering and a shared-value-driven row ordering.

pub mod harmonize;
pub mod matrix;

pub use harmonize::{align_tables, harmonize_columns, most_similar_columns, reorder_rows};
pub use matrix::{Cell, CellKey, Column, ColumnType, TableMatrix};
