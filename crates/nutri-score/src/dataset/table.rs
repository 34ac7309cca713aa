use super::DatasetError;
use crate::record::{FieldValue, Record};
use serde::Serialize;

/// Ordered columns over a list of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Record] {
        &mut self.rows
    }

    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|name| name == column)
    }

    /// Registers a column if absent, e.g. after computing derived fields.
    pub fn ensure_column(&mut self, column: &str) {
        if !self.has_column(column) {
            self.columns.push(column.to_string());
        }
    }

    pub fn push_row(&mut self, row: Record) {
        self.rows.push(row);
    }

    pub(crate) fn retain_rows(&mut self, mut keep: impl FnMut(usize) -> bool) {
        let mut index = 0;
        self.rows.retain(|_| {
            let kept = keep(index);
            index += 1;
            kept
        });
    }

    /// Cells of one row in column order.
    pub fn row_values<'a>(&'a self, row: &'a Record) -> impl Iterator<Item = &'a FieldValue> + 'a {
        static MISSING: FieldValue = FieldValue::Missing;
        self.columns
            .iter()
            .map(move |column| row.get(column).unwrap_or(&MISSING))
    }

    /// Non-missing cell count per column, in column order.
    pub fn column_counts(&self) -> Vec<(&str, usize)> {
        self.columns
            .iter()
            .map(|column| {
                let count = self
                    .rows
                    .iter()
                    .filter(|row| !row.is_missing(column))
                    .count();
                (column.as_str(), count)
            })
            .collect()
    }

    /// Sub-table by column name and row position; `None` keeps everything.
    pub fn select(
        &self,
        columns: Option<&[&str]>,
        rows: Option<&[usize]>,
    ) -> Result<Table, DatasetError> {
        let columns = match columns {
            Some(names) => names
                .iter()
                .map(|name| {
                    if self.has_column(name) {
                        Ok(name.to_string())
                    } else {
                        Err(DatasetError::UnknownColumn(name.to_string()))
                    }
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => self.columns.clone(),
        };
        self.project(columns, rows)
    }

    /// Sub-table by column and row position; `None` keeps everything.
    pub fn select_positions(
        &self,
        columns: Option<&[usize]>,
        rows: Option<&[usize]>,
    ) -> Result<Table, DatasetError> {
        let columns = match columns {
            Some(positions) => positions
                .iter()
                .map(|position| {
                    self.columns
                        .get(*position)
                        .cloned()
                        .ok_or(DatasetError::ColumnOutOfRange {
                            position: *position,
                            columns: self.columns.len(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => self.columns.clone(),
        };
        self.project(columns, rows)
    }

    fn project(&self, columns: Vec<String>, rows: Option<&[usize]>) -> Result<Table, DatasetError> {
        let picked: Vec<&Record> = match rows {
            Some(positions) => positions
                .iter()
                .map(|position| {
                    self.rows.get(*position).ok_or(DatasetError::RowOutOfRange {
                        position: *position,
                        rows: self.rows.len(),
                    })
                })
                .collect::<Result<_, _>>()?,
            None => self.rows.iter().collect(),
        };

        let rows = picked
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .filter_map(|column| {
                        row.get(column)
                            .map(|value| (column.clone(), value.clone()))
                    })
                    .collect()
            })
            .collect();

        Ok(Table { columns, rows })
    }
}
