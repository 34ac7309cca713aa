//! Tabular helpers used to prepare product exports before scoring.

mod completeness;
mod duplicates;
mod table;

pub use completeness::{
    col_completeness, col_filled_at_least, col_filled_at_most, col_filled_between,
    empty_columns, full_columns, Completeness, FillFilter, FillStat,
};
pub use duplicates::{merge_rows, remove_duplicates, DuplicateGroup};
pub use table::Table;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("column position {position} is out of range for {columns} columns")]
    ColumnOutOfRange { position: usize, columns: usize },
    #[error("row position {position} is out of range for {rows} rows")]
    RowOutOfRange { position: usize, rows: usize },
    #[error("fill fraction {0} must lie between 0 and 1")]
    InvalidFraction(f64),
    #[error("fill range {low}..{high} is inverted")]
    InvertedRange { low: f64, high: f64 },
}
