use super::table::Table;
use super::DatasetError;
use serde::Serialize;

/// Which columns to keep, by fraction of filled rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillFilter {
    /// Filled in at least this fraction of rows.
    AtLeast(f64),
    /// Filled in at most this fraction of rows.
    AtMost(f64),
    /// Filled within the inclusive range.
    Between(f64, f64),
}

impl FillFilter {
    fn validate(&self) -> Result<(), DatasetError> {
        let check = |fraction: f64| {
            if fraction.is_finite() && (0.0..=1.0).contains(&fraction) {
                Ok(())
            } else {
                Err(DatasetError::InvalidFraction(fraction))
            }
        };

        match *self {
            FillFilter::AtLeast(p) | FillFilter::AtMost(p) => check(p),
            FillFilter::Between(low, high) => {
                check(low)?;
                check(high)?;
                if low > high {
                    return Err(DatasetError::InvertedRange { low, high });
                }
                Ok(())
            }
        }
    }

    fn keeps(&self, count: usize, rows: usize) -> bool {
        let count = count as f64;
        let rows = rows as f64;
        match *self {
            FillFilter::AtLeast(p) => count >= p * rows,
            FillFilter::AtMost(p) => count <= p * rows,
            FillFilter::Between(low, high) => count >= low * rows && count <= high * rows,
        }
    }
}

/// Shape of the completeness report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillStat {
    #[default]
    Names,
    Count,
    Ratio { digits: Option<u32> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Completeness {
    Names(Vec<String>),
    Counts(Vec<(String, usize)>),
    Ratios(Vec<(String, f64)>),
}

impl Completeness {
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Completeness::Names(names) => names.iter().map(String::as_str).collect(),
            Completeness::Counts(counts) => counts.iter().map(|(name, _)| name.as_str()).collect(),
            Completeness::Ratios(ratios) => ratios.iter().map(|(name, _)| name.as_str()).collect(),
        }
    }
}

/// Columns passing `filter`, reported as names, counts or fill ratios.
///
/// An empty table reports every ratio as zero. Rounding is half away from zero.
pub fn col_completeness(
    table: &Table,
    filter: FillFilter,
    stat: FillStat,
) -> Result<Completeness, DatasetError> {
    let rows = table.rows().len();
    let kept = kept_columns(table, filter)?.into_iter();

    Ok(match stat {
        FillStat::Names => Completeness::Names(kept.map(|(column, _)| column).collect()),
        FillStat::Count => Completeness::Counts(kept.collect()),
        FillStat::Ratio { digits } => Completeness::Ratios(
            kept.map(|(column, count)| (column, fill_ratio(count, rows, digits)))
                .collect(),
        ),
    })
}

fn kept_columns(table: &Table, filter: FillFilter) -> Result<Vec<(String, usize)>, DatasetError> {
    filter.validate()?;

    let rows = table.rows().len();
    Ok(table
        .column_counts()
        .into_iter()
        .filter(|(_, count)| filter.keeps(*count, rows))
        .map(|(column, count)| (column.to_string(), count))
        .collect())
}

fn fill_ratio(count: usize, rows: usize, digits: Option<u32>) -> f64 {
    if rows == 0 {
        return 0.0;
    }
    let ratio = count as f64 / rows as f64;
    let factor = digits
        .and_then(|digits| i32::try_from(digits).ok())
        .map(|digits| 10f64.powi(digits))
        .filter(|factor| factor.is_finite());
    match factor {
        Some(factor) => (ratio * factor).round() / factor,
        // Beyond f64 precision rounding is a no-op.
        None => ratio,
    }
}

fn names(table: &Table, filter: FillFilter) -> Result<Vec<String>, DatasetError> {
    Ok(kept_columns(table, filter)?
        .into_iter()
        .map(|(column, _)| column)
        .collect())
}

pub fn col_filled_at_least(table: &Table, fraction: f64) -> Result<Vec<String>, DatasetError> {
    names(table, FillFilter::AtLeast(fraction))
}

pub fn col_filled_at_most(table: &Table, fraction: f64) -> Result<Vec<String>, DatasetError> {
    names(table, FillFilter::AtMost(fraction))
}

pub fn col_filled_between(table: &Table, low: f64, high: f64) -> Result<Vec<String>, DatasetError> {
    names(table, FillFilter::Between(low, high))
}

/// Columns with no missing cell.
pub fn full_columns(table: &Table) -> Vec<String> {
    col_filled_at_least(table, 1.0).unwrap_or_default()
}

/// Columns with no filled cell.
pub fn empty_columns(table: &Table) -> Vec<String> {
    col_filled_at_most(table, 0.0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn sample() -> Table {
        let columns = ["code", "energy_100g", "fiber_100g", "additives"]
            .into_iter()
            .map(String::from)
            .collect();
        let rows = (0..4)
            .map(|index| {
                let mut row = Record::new().with("code", format!("{index:03}"));
                if index < 3 {
                    row.set("energy_100g", 100.0 * f64::from(index));
                }
                if index == 0 {
                    row.set("fiber_100g", 2.0);
                }
                row
            })
            .collect();
        Table::new(columns, rows)
    }

    #[test]
    fn full_and_empty_columns() {
        let table = sample();
        assert_eq!(full_columns(&table), vec!["code"]);
        assert_eq!(empty_columns(&table), vec!["additives"]);
    }

    #[test]
    fn thresholds_are_inclusive() {
        let table = sample();
        assert_eq!(
            col_filled_at_least(&table, 0.75).expect("valid fraction"),
            vec!["code", "energy_100g"]
        );
        assert_eq!(
            col_filled_at_most(&table, 0.25).expect("valid fraction"),
            vec!["fiber_100g", "additives"]
        );
        assert_eq!(
            col_filled_between(&table, 0.25, 0.75).expect("valid range"),
            vec!["energy_100g", "fiber_100g"]
        );
    }

    #[test]
    fn ratio_report_rounds_when_requested() {
        let table = sample();
        let report = col_completeness(
            &table,
            FillFilter::Between(0.1, 0.9),
            FillStat::Ratio { digits: Some(2) },
        )
        .expect("valid range");

        assert_eq!(
            report,
            Completeness::Ratios(vec![
                ("energy_100g".to_string(), 0.75),
                ("fiber_100g".to_string(), 0.25),
            ])
        );
    }

    #[test]
    fn oversized_precision_leaves_ratio_unrounded() {
        assert_eq!(fill_ratio(3, 4, Some(400)), 0.75);
        assert_eq!(fill_ratio(0, 4, Some(400)), 0.0);
        assert_eq!(fill_ratio(1, 3, Some(u32::MAX)), 1.0 / 3.0);
        assert_eq!(fill_ratio(1, 3, Some(0)), 0.0);
    }

    #[test]
    fn count_report_keeps_column_order() {
        let report = col_completeness(&sample(), FillFilter::AtLeast(0.0), FillStat::Count)
            .expect("valid fraction");
        assert_eq!(
            report,
            Completeness::Counts(vec![
                ("code".to_string(), 4),
                ("energy_100g".to_string(), 3),
                ("fiber_100g".to_string(), 1),
                ("additives".to_string(), 0),
            ])
        );
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        let table = sample();
        assert_eq!(
            col_filled_at_least(&table, 1.5),
            Err(DatasetError::InvalidFraction(1.5))
        );
        assert_eq!(
            col_filled_between(&table, 0.8, 0.2),
            Err(DatasetError::InvertedRange {
                low: 0.8,
                high: 0.2
            })
        );
    }
}
