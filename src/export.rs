use crate::error::RefinderError;
use crate::result_table::{ResultTable, TABLE_HEADER};
use std::fs::File;
use std::io::Write;

/// Writes the result table as CSV, one row per accepted hit, with the
/// same column set the on-screen table uses. Failure is the caller's to
/// report; the search core never sees it.
pub fn write_csv<W: Write>(table: &ResultTable, writer: W) -> Result<(), RefinderError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(TABLE_HEADER)?;
    for row in table.rows() {
        csv_writer.write_record([
            row.position.to_string(),
            row.tis_position.to_string(),
            row.sequence.clone(),
            format!("{:.1}", row.homology),
            row.reference_variant.clone(),
            row.target_name.clone(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_file(table: &ResultTable, filename: &str) -> Result<(), RefinderError> {
    let file = File::create(filename)?;
    write_csv(table, file)
}
