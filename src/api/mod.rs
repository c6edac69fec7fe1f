//! API module - HTTP surface

mod routes;

pub use routes::{router, AnalyzeResponse, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_UPLOAD_LIMIT_MB};
