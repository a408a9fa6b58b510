//! HTTP handlers for the upload endpoints.
//!
//! Every analysis endpoint follows the same flow: take the multipart `file`
//! field, save it under the upload directory, run the pipeline on a blocking
//! thread and answer with the chart name → URL map.

use std::path::{Path, PathBuf};

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::app::pipeline::{self, PipelineOptions};
use crate::cli::picker::has_csv_extension;
use crate::error::AppError;
use crate::report::{ReportOutput, ReportProfile};

use super::AppState;

const UPLOAD_FIELD: &str = "file";
const MISSING_FILE: &str = "No file part in the request.";
const NOT_CSV: &str = "Invalid file format. Please upload a CSV file.";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub async fn investor_analysis(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ReportOutput>, AppError> {
    analyze_upload(state, multipart, ReportProfile::Investor).await
}

pub async fn sales_forecast(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ReportOutput>, AppError> {
    analyze_upload(state, multipart, ReportProfile::Forecast).await
}

pub async fn combined_analysis(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ReportOutput>, AppError> {
    analyze_upload(state, multipart, ReportProfile::Combined).await
}

pub async fn sales_forecast_usage() -> Json<Value> {
    Json(json!({ "message": "Use POST to upload CSV files." }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn analyze_upload(
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
    profile: ReportProfile,
) -> Result<Json<ReportOutput>, AppError> {
    // A body that is not multipart at all carries no file part either.
    let Ok(multipart) = multipart else {
        return Err(AppError::upload(MISSING_FILE));
    };
    let saved = save_upload(&state.config.upload_dir, multipart).await?;

    let options = PipelineOptions {
        ingest: state.config.ingest,
        report: state.config.report.clone(),
        render_charts: true,
    };
    let run = tokio::task::spawn_blocking(move || pipeline::run_analysis_from_path(&saved, profile, &options))
        .await
        .map_err(|e| AppError::Server(format!("analysis task failed: {e}")))??;

    info!(
        ?profile,
        rows = run.summary.rows_used,
        dropped = run.summary.rows_dropped,
        charts = run.report.charts.len(),
        "upload analyzed"
    );
    Ok(Json(run.report))
}

/// Stream the `file` field to disk and return where it landed.
async fn save_upload(upload_dir: &Path, mut multipart: Multipart) -> Result<PathBuf, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::upload(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .and_then(sanitize_file_name)
            .filter(|name| has_csv_extension(Path::new(name)))
            .ok_or_else(|| AppError::upload(NOT_CSV))?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::upload(format!("Failed to read upload: {e}")))?;

        tokio::fs::create_dir_all(upload_dir).await?;
        let path = upload_dir.join(&file_name);
        tokio::fs::write(&path, &bytes).await?;
        info!(file = %path.display(), bytes = bytes.len(), "upload saved");
        return Ok(path);
    }

    Err(AppError::upload(MISSING_FILE))
}

/// Keep only the final path component of a client-supplied file name.
///
/// Both `/` and `\` count as separators; `.`/`..` and empty names are refused.
fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_reduced_to_their_last_component() {
        assert_eq!(sanitize_file_name("sales.csv").as_deref(), Some("sales.csv"));
        assert_eq!(sanitize_file_name("../../etc/sales.csv").as_deref(), Some("sales.csv"));
        assert_eq!(sanitize_file_name("C:\\Users\\me\\sales.csv").as_deref(), Some("sales.csv"));
        assert_eq!(sanitize_file_name("dir/"), None);
        assert_eq!(sanitize_file_name(".."), None);
        assert_eq!(sanitize_file_name(""), None);
    }
}
