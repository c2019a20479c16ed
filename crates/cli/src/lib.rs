pub mod constants;
pub mod csv;
pub mod file_utils;
pub mod flatten;
pub mod model;
pub mod pagination;
pub mod repository_utils;
pub mod watch_utils;
pub mod xray_utils;
