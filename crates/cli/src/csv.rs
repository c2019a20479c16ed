use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;

use crate::constants::REPORT_HEADER;
use crate::flatten::ReportRow;

/// Create the report file. The file is created fresh: a previous report for
/// the same watch is overwritten. The header is written by the export run,
/// not here, so it lands exactly once even on a retried invocation.
pub fn report_writer(path: &Path) -> Result<Writer<File>> {
    Writer::from_path(path)
        .with_context(|| format!("cannot create report file {}", path.display()))
}

pub fn write_report_header<W: Write>(wtr: &mut Writer<W>) -> Result<()> {
    wtr.write_record(REPORT_HEADER)
        .context("cannot write the report header")
}

/// Append flattened rows, one record per row, in the given order. Quoting is
/// the csv crate default: fields containing the delimiter, a quote or a
/// newline get quoted, internal quotes doubled.
pub fn write_rows<W: Write>(wtr: &mut Writer<W>, rows: &[ReportRow]) -> Result<()> {
    for row in rows {
        wtr.write_record(row.as_record())
            .context("cannot write a report row")?;
    }
    Ok(())
}
