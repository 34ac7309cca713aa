use super::table::Table;
use super::DatasetError;
use crate::record::Record;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// Outcome for one duplicated key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub key: String,
    /// Position of the surviving row in the input table.
    pub kept_row: usize,
    pub removed_rows: Vec<usize>,
    /// Columns of the surviving row filled from removed rows.
    pub changed_columns: Vec<String>,
}

/// Fills each missing column of `kept` with the first non-missing value among `others`.
/// Returns the columns that changed.
pub fn merge_rows(kept: &mut Record, others: &[&Record], columns: &[String]) -> Vec<String> {
    let mut changed = Vec::new();
    for column in columns {
        if !kept.is_missing(column) {
            continue;
        }
        let donor = others
            .iter()
            .filter_map(|row| row.get(column))
            .find(|value| !value.is_missing());
        if let Some(value) = donor {
            kept.set(column.clone(), value.clone());
            changed.push(column.clone());
        }
    }
    changed
}

/// Collapses rows sharing a value in `key_column`.
///
/// The row with the most filled cells survives, the earliest one on ties.
/// Rows with a missing key are left alone. With `merge`, gaps in the surviving
/// row are filled from the removed ones. Groups are reported in order of the
/// key's first appearance, not in sorted key order as a pandas `groupby` would.
pub fn remove_duplicates(
    table: &mut Table,
    key_column: &str,
    merge: bool,
) -> Result<Vec<DuplicateGroup>, DatasetError> {
    if !table.has_column(key_column) {
        return Err(DatasetError::UnknownColumn(key_column.to_string()));
    }

    let mut order: Vec<String> = Vec::new();
    let mut positions: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, row) in table.rows().iter().enumerate() {
        let Some(value) = row.get(key_column).filter(|value| !value.is_missing()) else {
            continue;
        };
        let key = value.to_string();
        let entry = positions.entry(key.clone()).or_default();
        if entry.is_empty() {
            order.push(key);
        }
        entry.push(index);
    }

    let columns = table.columns().to_vec();
    let mut groups = Vec::new();
    let mut removed = vec![false; table.rows().len()];

    for key in order {
        let Some(members) = positions.remove(&key) else {
            continue;
        };
        if members.len() < 2 {
            continue;
        }

        let rows = table.rows();
        let mut kept_row = members[0];
        for &index in &members[1..] {
            if rows[index].filled_count() > rows[kept_row].filled_count() {
                kept_row = index;
            }
        }
        let removed_rows: Vec<usize> = members
            .iter()
            .copied()
            .filter(|index| *index != kept_row)
            .collect();

        let changed_columns = if merge {
            let donors: Vec<Record> = removed_rows.iter().map(|index| rows[*index].clone()).collect();
            let donor_refs: Vec<&Record> = donors.iter().collect();
            merge_rows(&mut table.rows_mut()[kept_row], &donor_refs, &columns)
        } else {
            Vec::new()
        };

        for index in &removed_rows {
            removed[*index] = true;
        }
        groups.push(DuplicateGroup {
            key,
            kept_row,
            removed_rows,
            changed_columns,
        });
    }

    table.retain_rows(|index| !removed[index]);

    info!(
        key_column,
        groups = groups.len(),
        removed = removed.iter().filter(|flag| **flag).count(),
        merge,
        "removed duplicate rows"
    );

    Ok(groups)
}
