use cli::constants::{
    CARGO_VERSION, EXIT_CODE_INVALID_ARGUMENTS, EXIT_CODE_NO_ACCESS_TOKEN,
    EXIT_CODE_WATCH_UPDATE_FAILED,
};
use cli::watch_utils::{add_repository_to_watch, WatchUpdateOutcome};
use cli::xray_utils::{get_access_token, XrayClient};

use getopts::Options;
use std::env;
use std::path::Path;
use std::process::exit;

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} SERVER_URL WATCH_NAME REPO_KEY [options]", program);
    print!("{}", opts.usage(&brief));
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();
    let mut opts = Options::new();
    opts.optopt(
        "b",
        "backup-dir",
        "directory for the watch definition backup",
        ".",
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

    if matches.free.len() != 3 {
        eprintln!("SERVER_URL, WATCH_NAME and REPO_KEY are required");
        print_usage(&program, opts);
        exit(EXIT_CODE_INVALID_ARGUMENTS)
    }
    let server_url = matches.free[0].clone();
    let watch_name = matches.free[1].clone();
    let repo_key = matches.free[2].clone();
    let backup_dir = matches.opt_str("b").unwrap_or_else(|| ".".to_string());

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
            exit(EXIT_CODE_WATCH_UPDATE_FAILED)
        }
    };

    match add_repository_to_watch(&client, &watch_name, &repo_key, Path::new(&backup_dir)) {
        Ok(WatchUpdateOutcome::Updated { backup }) => {
            println!(
                "repository {} added to watch {}, previous definition saved in {}",
                repo_key,
                watch_name,
                backup.display()
            );
        }
        Ok(WatchUpdateOutcome::AlreadyAssigned) => {
            println!(
                "repository {} is already assigned to watch {}, nothing to do",
                repo_key, watch_name
            );
        }
        Ok(WatchUpdateOutcome::Skipped { rclass }) => {
            eprintln!(
                "warning: repository {} has class {} which a watch cannot track, skipping",
                repo_key, rclass
            );
        }
        Err(error) => {
            eprintln!("{:#}", error);
            exit(EXIT_CODE_WATCH_UPDATE_FAILED)
        }
    }
}
