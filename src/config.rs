//! Resolved runtime configuration.
//!
//! clap owns parsing (flags, env vars, defaults); this module turns parsed
//! arguments into the plain structs the pipeline and server consume, and
//! rejects combinations clap cannot express.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::cli::{ReportArgs, ServeArgs};
use crate::error::AppError;
use crate::io::ingest::IngestOptions;
use crate::report::ReportConfig;

const BYTES_PER_MIB: usize = 1024 * 1024;

/// Everything the HTTP service needs.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub report: ReportConfig,
    pub ingest: IngestOptions,
}

impl ServerConfig {
    pub fn from_args(args: &ServeArgs) -> Result<Self, AppError> {
        if args.max_upload_mb == 0 {
            return Err(AppError::Config("--max-upload-mb must be at least 1.".to_string()));
        }

        Ok(Self {
            bind: args.bind,
            upload_dir: args.upload_dir.clone(),
            max_upload_bytes: args.max_upload_mb.saturating_mul(BYTES_PER_MIB),
            report: report_config_from_args(&args.report)?,
            ingest: ingest_options_from_args(&args.report),
        })
    }
}

pub fn report_config_from_args(args: &ReportArgs) -> Result<ReportConfig, AppError> {
    if args.top == 0 {
        return Err(AppError::Config("--top must be at least 1.".to_string()));
    }
    if args.width < 100 || args.height < 100 {
        return Err(AppError::Config(format!(
            "Chart size {}x{} is too small (minimum 100x100).",
            args.width, args.height
        )));
    }

    Ok(ReportConfig {
        output_dir: args.output_dir.clone(),
        url_prefix: normalize_url_prefix(&args.url_prefix)?,
        width: args.width,
        height: args.height,
        top_n: args.top,
    })
}

pub fn ingest_options_from_args(args: &ReportArgs) -> IngestOptions {
    IngestOptions {
        revenue_policy: args.revenue_policy,
    }
}

/// `/static/plots/` → `/static/plots`. The prefix must be a non-root absolute path.
fn normalize_url_prefix(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !trimmed.starts_with('/') || trimmed.len() < 2 {
        return Err(AppError::Config(format!(
            "URL prefix must be an absolute, non-root path like /static/plots (got '{raw}')."
        )));
    }
    Ok(trimmed.to_string())
}
