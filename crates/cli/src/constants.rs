pub const CARGO_VERSION: &str = env!("CARGO_PKG_VERSION");

pub static HEADER_CONTENT_TYPE: &str = "Content-Type";
pub static HEADER_CONTENT_TYPE_APPLICATION_JSON: &str = "application/json";

pub static DEFAULT_PAGE_LIMIT: u64 = 100;
pub static VIOLATIONS_TIMEOUT_SECONDS: u64 = 30;
pub static METADATA_TIMEOUT_SECONDS: u64 = 10;

// sentinel for a violation without an applicability detail
pub static NOT_AVAILABLE: &str = "N/A";
// sentinel for a repository without resolvable users
pub static NO_ASSIGNMENT: &str = "NA";

pub static REPORT_HEADER: [&str; 8] = [
    "Type",
    "WatchName",
    "Severity",
    "RepoNameOfImpactedArtifact",
    "ImpactedArtifacts",
    "Vulnerability_Id",
    "Issue_ID",
    "Description",
];

// application errors: greater or equal to 10 and less than 50
pub static EXIT_CODE_EXPORT_FAILED: i32 = 10;
pub static EXIT_CODE_WATCH_UPDATE_FAILED: i32 = 11;
pub static EXIT_CODE_USER_LOOKUP_FAILED: i32 = 12;

// user errors, all more than 50
pub static EXIT_CODE_INVALID_ARGUMENTS: i32 = 50;
pub static EXIT_CODE_WATCH_NOT_FOUND: i32 = 51;
pub static EXIT_CODE_NO_ACCESS_TOKEN: i32 = 52;
