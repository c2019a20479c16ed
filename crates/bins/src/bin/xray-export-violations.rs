use cli::constants::{
    CARGO_VERSION, DEFAULT_PAGE_LIMIT, EXIT_CODE_EXPORT_FAILED, EXIT_CODE_INVALID_ARGUMENTS,
    EXIT_CODE_NO_ACCESS_TOKEN, EXIT_CODE_WATCH_NOT_FOUND,
};
use cli::csv::{report_writer, write_report_header, write_rows};
use cli::file_utils::{ExportPaths, ScopedFile};
use cli::flatten::flatten_violation;
use cli::pagination::export_violations;
use cli::xray_utils::{get_access_token, XrayClient};

use anyhow::{Context, Result};
use getopts::Options;
use indicatif::ProgressBar;
use std::env;
use std::process::exit;

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} SERVER_URL WATCH_NAME [options]", program);
    print!("{}", opts.usage(&brief));
}

// Fetch only the first page, dump the raw response next to the report and
// write whatever rows that page carries. The dump is removed again when the
// report cannot be written.
fn export_single_page(client: &XrayClient, watch_name: &str, limit: u64, paths: &ExportPaths) -> Result<()> {
    let (page, raw) = client
        .fetch_violations_page_with_raw(watch_name, limit, 0)
        .context("cannot fetch page 1 (offset 0)")?;
    let dump = ScopedFile::write(&paths.raw_page, raw.as_bytes())?;

    let mut wtr = report_writer(&paths.report)?;
    write_report_header(&mut wtr)?;
    let rows: Vec<_> = page.violations.iter().map(flatten_violation).collect();
    write_rows(&mut wtr, &rows)?;
    wtr.flush().context("cannot flush the report file")?;

    let kept = dump.keep();
    println!(
        "wrote {} of {} reported rows to {} (first page only), raw response in {}",
        rows.len(),
        page.total_violations.unwrap_or(0),
        paths.report.display(),
        kept.display()
    );
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();
    let mut opts = Options::new();
    opts.optopt("o", "output", "report file to write", "violations.csv");
    opts.optopt("l", "limit", "violations per page", "100");
    opts.optflag(
        "",
        "single-page",
        "fetch only the first page and keep the raw response",
    );
    opts.optflag("h", "help", "print this help");
    opts.optflag("v", "version", "shows the version");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            eprintln!("error when parsing arguments: {}", f);
            print_usage(&program, opts);
            exit(EXIT_CODE_INVALID_ARGUMENTS)
        }
    };

    if matches.opt_present("v") {
        println!("{}", CARGO_VERSION);
        exit(1);
    }

    if matches.opt_present("h") {
        print_usage(&program, opts);
        exit(1);
    }

    if matches.free.len() != 2 {
        eprintln!("SERVER_URL and WATCH_NAME are required");
        print_usage(&program, opts);
        exit(EXIT_CODE_INVALID_ARGUMENTS)
    }
    let server_url = matches.free[0].clone();
    let watch_name = matches.free[1].clone();

    let limit = match matches.opt_str("l").map(|value| value.parse::<u64>()) {
        None => DEFAULT_PAGE_LIMIT,
        Some(Ok(limit)) if limit > 0 => limit,
        Some(_) => {
            eprintln!("--limit must be a positive integer");
            exit(EXIT_CODE_INVALID_ARGUMENTS)
        }
    };

    let access_token = match get_access_token() {
        Ok(token) => token,
        Err(error) => {
            eprintln!("{:#}", error);
            eprintln!("set JF_ACCESS_TOKEN or JFROG_ACCESS_TOKEN");
            exit(EXIT_CODE_NO_ACCESS_TOKEN)
        }
    };
    let client = match XrayClient::new(&server_url, access_token) {
        Ok(client) => client,
        Err(error) => {
            eprintln!("{:#}", error);
            exit(EXIT_CODE_EXPORT_FAILED)
        }
    };

    if let Err(error) = client.validate_watch(&watch_name) {
        eprintln!("{:#}", error);
        exit(EXIT_CODE_WATCH_NOT_FOUND)
    }

    let paths = ExportPaths::for_watch(&watch_name, matches.opt_str("o"));

    if matches.opt_present("single-page") {
        if let Err(error) = export_single_page(&client, &watch_name, limit, &paths) {
            eprintln!("{:#}", error);
            exit(EXIT_CODE_EXPORT_FAILED)
        }
        return;
    }

    let mut wtr = match report_writer(&paths.report) {
        Ok(wtr) => wtr,
        Err(error) => {
            eprintln!("{:#}", error);
            exit(EXIT_CODE_EXPORT_FAILED)
        }
    };

    let source = client.violation_source(&watch_name);
    let mut progress: Option<ProgressBar> = None;
    let result = export_violations(&source, limit, &mut wtr, |_, total_pages| {
        progress
            .get_or_insert_with(|| ProgressBar::new(total_pages))
            .inc(1);
    });
    if let Some(progress) = &progress {
        progress.finish();
    }

    match result {
        Ok(summary) => {
            println!(
                "wrote {} of {} reported rows to {}",
                summary.rows_written,
                summary.total_reported,
                paths.report.display()
            );
            if summary.truncated {
                eprintln!("warning: the export stopped early, the report is a lower bound");
            } else if summary.rows_written < summary.total_reported {
                eprintln!(
                    "warning: the server reported {} violations but returned {}",
                    summary.total_reported, summary.rows_written
                );
            }
        }
        Err(error) => {
            eprintln!("{:#}", error);
            eprintln!(
                "the partial report written so far is kept in {}",
                paths.report.display()
            );
            exit(EXIT_CODE_EXPORT_FAILED)
        }
    }
}
