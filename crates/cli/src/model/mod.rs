pub mod xray_api;
