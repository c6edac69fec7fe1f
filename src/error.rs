//! Top-level error type for the analysis pipeline.
//! Each stage keeps its own thiserror enum; this aggregates them for the
//! HTTP layer, which maps variants to status codes.

use thiserror::Error;

use crate::charts::ChartError;
use crate::data::filter::FilterError;
use crate::data::LoaderError;
use crate::report::ReportError;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// Malformed request before any stage ran (bad multipart, missing file).
    #[error("{0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error(transparent)]
    Report(#[from] ReportError),
}
