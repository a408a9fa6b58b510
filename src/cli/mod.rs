//! Command-line parsing for the sales analytics service.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the ingest/aggregation/chart code. Every option can also be set
//! through a `LOCALBOOST_*` environment variable (a `.env` file is honored).

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::RevenuePolicy;
use crate::report::ReportProfile;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "localboost", version, about = "Sales CSV analytics: aggregates, PNG charts, HTTP upload API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP service (upload endpoints + static chart files).
    Serve(ServeArgs),
    /// Analyze a local CSV: print aggregates and write charts.
    ///
    /// Without a path, an interactive picker lists CSV files under the
    /// current directory.
    Analyze(AnalyzeArgs),
    /// Write an empty CSV with the expected upload headers.
    Template(TemplateArgs),
    /// Generate a synthetic daily sales CSV.
    Sample(SampleArgs),
}

/// Options shared by every command that ingests data and renders charts.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    /// Directory charts are written to.
    #[arg(long, env = "LOCALBOOST_OUTPUT_DIR", default_value = "static/plots")]
    pub output_dir: PathBuf,

    /// URL path under which the output directory is served.
    #[arg(long, env = "LOCALBOOST_URL_PREFIX", default_value = "/static/plots")]
    pub url_prefix: String,

    /// How rows with a blank or non-numeric revenue are treated.
    #[arg(long, env = "LOCALBOOST_REVENUE_POLICY", value_enum, default_value_t = RevenuePolicy::Strict)]
    pub revenue_policy: RevenuePolicy,

    /// Number of products in the top-products chart.
    #[arg(long, env = "LOCALBOOST_TOP", default_value_t = 5)]
    pub top: usize,

    /// Chart width (pixels).
    #[arg(long, env = "LOCALBOOST_CHART_WIDTH", default_value_t = 1200)]
    pub width: u32,

    /// Chart height (pixels).
    #[arg(long, env = "LOCALBOOST_CHART_HEIGHT", default_value_t = 700)]
    pub height: u32,
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Socket address to listen on.
    #[arg(long, env = "LOCALBOOST_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Directory uploaded CSV files are saved to.
    #[arg(long, env = "LOCALBOOST_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Maximum accepted request body (MiB).
    #[arg(long, env = "LOCALBOOST_MAX_UPLOAD_MB", default_value_t = 16)]
    pub max_upload_mb: usize,

    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Sales CSV to analyze (omit to pick one interactively).
    #[arg(value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Which set of charts to render.
    #[arg(long, value_enum, default_value_t = ReportProfile::Combined)]
    pub profile: ReportProfile,

    /// Skip chart rendering and only print the summary.
    #[arg(long)]
    pub no_charts: bool,

    /// Export the aggregate summary to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(Debug, Args, Clone)]
pub struct TemplateArgs {
    /// Output path for the template CSV.
    #[arg(long, default_value = "sales_upload_template.csv")]
    pub out: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output path for the generated CSV.
    #[arg(long, default_value = "sample_sales.csv")]
    pub out: PathBuf,

    /// First day (YYYY-MM-DD).
    #[arg(long, default_value = "2022-01-01")]
    pub start: NaiveDate,

    /// Last day, inclusive (YYYY-MM-DD).
    #[arg(long, default_value = "2023-12-31")]
    pub end: NaiveDate,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
