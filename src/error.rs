use axum::http::StatusCode;
use thiserror::Error;

/// Problems with the uploaded data itself (bad schema, unusable values).
///
/// These are the caller's fault and surface as HTTP 400 / exit code 2.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid revenue value '{value}' on line {line}")]
    InvalidRevenue { line: usize, value: String },

    #[error("Revenue values are too large to total (overflow at line {line}).")]
    RevenueOverflow { line: usize },

    #[error("No valid rows remain after validation ({dropped} row(s) dropped).")]
    EmptyLedger { dropped: usize },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Upload(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chart rendering failed for '{chart}': {message}")]
    Chart { chart: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn upload(message: impl Into<String>) -> Self {
        AppError::Upload(message.into())
    }

    pub fn chart(chart: impl Into<String>, message: impl std::fmt::Display) -> Self {
        AppError::Chart {
            chart: chart.into(),
            message: message.to_string(),
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Validation(ValidationError::EmptyLedger { .. }) => 3,
            AppError::Validation(_) | AppError::Upload(_) | AppError::Config(_) => 2,
            AppError::Csv(_)
            | AppError::Io(_)
            | AppError::Chart { .. }
            | AppError::Json(_)
            | AppError::Server(_) => 4,
        }
    }

    /// HTTP status for the upload endpoints.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Upload(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
