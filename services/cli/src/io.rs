use nutri_score::dataset::Table;
use nutri_score::error::AppError;
use nutri_score::record::{FieldValue, Record};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

pub(crate) fn read_table_from_path(path: &Path) -> Result<Table, AppError> {
    let file = File::open(path)?;
    let table = read_table(file)?;
    debug!(path = %path.display(), rows = table.shape().0, "loaded product table");
    Ok(table)
}

pub(crate) fn read_table<R: Read>(reader: R) -> Result<Table, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut table = Table::new(columns.clone(), Vec::new());
    for row in csv_reader.records() {
        let row = row?;
        let record: Record = columns
            .iter()
            .zip(row.iter())
            .map(|(column, cell)| (column.as_str(), parse_cell(cell)))
            .collect();
        table.push_row(record);
    }

    Ok(table)
}

pub(crate) fn write_table_to_path(table: &Table, path: &Path) -> Result<(), AppError> {
    let file = File::create(path)?;
    write_table(table, file)?;
    debug!(path = %path.display(), rows = table.shape().0, "wrote product table");
    Ok(())
}

pub(crate) fn write_table<W: Write>(table: &Table, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(table.columns())?;
    for row in table.rows() {
        csv_writer.write_record(table.row_values(row).map(FieldValue::to_string))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Empty and NaN cells are missing, numeric cells are numbers, anything else is text.
/// Digit-only identifiers such as barcodes stay text unless they survive the trip
/// through `f64` unchanged.
fn parse_cell(raw: &str) -> FieldValue {
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return FieldValue::Missing;
    }
    let digits_only = raw.bytes().all(|byte| byte.is_ascii_digit());
    match raw.parse::<f64>() {
        Ok(value) if digits_only && value.to_string() != raw => FieldValue::Text(raw.to_string()),
        Ok(value) if value.is_finite() => FieldValue::Number(value),
        _ => FieldValue::Text(raw.to_string()),
    }
}
