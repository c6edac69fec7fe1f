//! HTTP Routes Module
//! The /analyze endpoint: multipart upload in, JSON summary + base64 report out.

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::charts::BarChartRenderer;
use crate::data::{filter, FilterSpec, LoaderError, TableLoader};
use crate::error::AnalyzeError;
use crate::report::WorkbookBuilder;
use crate::stats::{ColumnSummary, StatsCalculator};

pub const DEFAULT_UPLOAD_LIMIT_MB: usize = 50;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// The /analyze success payload.
///
/// Workbook and chart bytes are base64-inlined in full, regardless of size;
/// the upload limit bounds the worst case.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub summary: BTreeMap<String, ColumnSummary>,
    pub output_file: String,
    pub chart_image: String,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    detail: String,
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        // Client-caused failures get 4xx instead of collapsing everything
        // into 500: bad extension and unparseable content are the caller's
        // doing, as is a filter naming a column the table does not have.
        let status = match &self {
            AnalyzeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AnalyzeError::Load(LoaderError::UnsupportedFormat) => StatusCode::BAD_REQUEST,
            AnalyzeError::Load(LoaderError::Parse(_)) => StatusCode::BAD_REQUEST,
            AnalyzeError::Filter(filter::FilterError::ColumnNotFound(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(ErrorDetail {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Build the application router.
///
/// The handler itself is stateless; limits and timeout are baked in as layers.
pub fn router(upload_limit_bytes: usize, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/analyze",
            post(analyze_handler).layer(DefaultBodyLimit::max(upload_limit_bytes)),
        )
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Run the full pipeline: parse, filter, aggregate, render, encode.
///
/// Stages execute sequentially within the request; the only await points are
/// the multipart body reads.
async fn analyze_handler(multipart: Multipart) -> Result<Json<AnalyzeResponse>, AnalyzeError> {
    let upload = parse_analyze_multipart(multipart).await?;
    info!(
        filename = %upload.filename,
        bytes = upload.data.len(),
        "analyzing upload"
    );

    let table = TableLoader::from_bytes(&upload.data, &upload.filename)?;
    let table = filter::apply(&table, &upload.filter)?;
    debug!(rows = table.height(), "table after filter stage");

    let means = StatsCalculator::column_means(&table);
    let summary: BTreeMap<String, ColumnSummary> =
        StatsCalculator::describe(&table).into_iter().collect();

    let chart = BarChartRenderer::render_means(&means)?;
    let workbook = WorkbookBuilder::build(&table, &chart)?;

    Ok(Json(AnalyzeResponse {
        summary,
        output_file: BASE64.encode(&workbook),
        chart_image: BASE64.encode(&chart.png),
    }))
}

struct AnalyzeUpload {
    data: Vec<u8>,
    filename: String,
    filter: FilterSpec,
}

async fn parse_analyze_multipart(mut multipart: Multipart) -> Result<AnalyzeUpload, AnalyzeError> {
    let mut data: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut column_filter: Option<String> = None;
    let mut value_filter: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AnalyzeError::InvalidRequest(format!("Failed to read multipart field: {e}"))
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                let bytes = field.bytes().await.map_err(|e| {
                    AnalyzeError::InvalidRequest(format!("Failed to read file data: {e}"))
                })?;
                data = Some(bytes.to_vec());
            }
            "column_filter" => {
                column_filter = Some(read_text_field(field, "column_filter").await?);
            }
            "value_filter" => {
                value_filter = Some(read_text_field(field, "value_filter").await?);
            }
            _ => {}
        }
    }

    let data =
        data.ok_or_else(|| AnalyzeError::InvalidRequest("No file provided in upload".to_string()))?;
    let filename = filename
        .ok_or_else(|| AnalyzeError::InvalidRequest("No filename provided".to_string()))?;

    Ok(AnalyzeUpload {
        data,
        filename,
        filter: FilterSpec::new(column_filter, value_filter),
    })
}

async fn read_text_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, AnalyzeError> {
    field
        .text()
        .await
        .map_err(|e| AnalyzeError::InvalidRequest(format!("Failed to read {name}: {e}")))
}
