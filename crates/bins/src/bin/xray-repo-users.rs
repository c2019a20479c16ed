use cli::constants::{
    CARGO_VERSION, EXIT_CODE_INVALID_ARGUMENTS, EXIT_CODE_NO_ACCESS_TOKEN,
    EXIT_CODE_USER_LOOKUP_FAILED,
};
use cli::repository_utils::repository_users;
use cli::xray_utils::{get_access_token, XrayClient};

use getopts::Options;
use std::env;
use std::process::exit;

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} SERVER_URL REPO_KEY... [options]", program);
    print!("{}", opts.usage(&brief));
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();
    let mut opts = Options::new();
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

    if matches.free.len() < 2 {
        eprintln!("SERVER_URL and at least one REPO_KEY are required");
        print_usage(&program, opts);
        exit(EXIT_CODE_INVALID_ARGUMENTS)
    }
    let server_url = matches.free[0].clone();
    let repo_keys = &matches.free[1..];

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
            exit(EXIT_CODE_USER_LOOKUP_FAILED)
        }
    };

    // lookups are best effort: a repository whose users cannot be resolved
    // prints the NA sentinel instead of failing the whole run
    for repo_key in repo_keys {
        println!("{}: {}", repo_key, repository_users(&client, repo_key));
    }
}
