use std::io::Write;

use anyhow::{ensure, Context, Result};
use csv::Writer;

use crate::csv::{write_report_header, write_rows};
use crate::flatten::{flatten_violation, ReportRow};
use crate::model::xray_api::ViolationsResponse;
use crate::xray_utils::FetchError;

/// One page at a time, no retries. Implemented over the network by
/// `xray_utils::WatchViolations`; tests drive the controller with an
/// in-memory source.
pub trait ViolationSource {
    fn fetch_page(&self, limit: u64, offset: u64) -> Result<ViolationsResponse, FetchError>;
}

/// What a finished run reports back. `total_reported` is the count the
/// service announced on page 1; when `truncated` is set the run stopped at
/// an anomalous empty page and `rows_written` is a lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub rows_written: u64,
    pub total_reported: u64,
    pub truncated: bool,
}

/// Drive a `ViolationSource` across all pages of the result set and append
/// the flattened rows to `wtr`.
///
/// The run moves through init -> fetching -> done/failed: the first page
/// (offset 0) announces the total, `ceil(total / limit)` pages are fetched
/// strictly in order with record-count offsets (`(page - 1) * limit`), and
/// each page is flattened and written before the next fetch is issued. A
/// fetch failure aborts the run; rows already written stay in `wtr`. A
/// zero-violation page before the final expected page stops the run early
/// with a warning instead of looping on a misbehaving upstream.
pub fn export_violations<S, W, F>(
    source: &S,
    limit: u64,
    wtr: &mut Writer<W>,
    mut on_page: F,
) -> Result<ExportSummary>
where
    S: ViolationSource,
    W: Write,
    F: FnMut(u64, u64),
{
    ensure!(limit > 0, "the page size limit must be greater than zero");

    write_report_header(wtr)?;

    let first_page = source
        .fetch_page(limit, 0)
        .context("cannot fetch page 1 (offset 0)")?;
    let total_reported = first_page.total_violations.unwrap_or(0);
    if total_reported == 0 {
        // a valid, empty result set: header-only report, success
        wtr.flush().context("cannot flush the report file")?;
        return Ok(ExportSummary {
            rows_written: 0,
            total_reported: 0,
            truncated: false,
        });
    }
    let total_pages = total_reported.div_ceil(limit);

    let mut rows_written: u64 = 0;
    let mut truncated = false;
    let mut page_number: u64 = 1;
    let mut page = first_page;
    loop {
        on_page(page_number, total_pages);
        let rows: Vec<ReportRow> = page.violations.iter().map(flatten_violation).collect();
        if rows.is_empty() && page_number < total_pages {
            eprintln!(
                "warning: server returned an empty page {} of {}, stopping early with {} of {} rows",
                page_number, total_pages, rows_written, total_reported
            );
            truncated = true;
            break;
        }
        write_rows(wtr, &rows)?;
        rows_written += rows.len() as u64;

        if page_number >= total_pages {
            break;
        }
        page_number += 1;
        let offset = (page_number - 1) * limit;
        page = source
            .fetch_page(limit, offset)
            .with_context(|| format!("cannot fetch page {} (offset {})", page_number, offset))?;
    }

    wtr.flush().context("cannot flush the report file")?;
    Ok(ExportSummary {
        rows_written,
        total_reported,
        truncated,
    })
}
