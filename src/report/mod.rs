//! Reporting: turn a ledger into chart artifacts and a name → URL map.
//!
//! Every report is a list of [`ChartSpec`]s. A spec says which reduction to
//! run and how to draw it; [`render_report`] does the rest, so the investor and
//! forecast reports share one code path and differ only in their chart lists.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::aggregate::{BucketOrder, DEFAULT_TOP_N, aggregate};
use crate::domain::{Bucketing, SalesLedger};
use crate::error::AppError;

pub mod chart;
pub mod format;

pub use format::*;

/// How a chart draws its buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    HorizontalBar,
}

/// One chart in a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    /// Key in the response map.
    pub name: &'static str,
    /// Fixed file name under the output directory (overwritten on every run).
    pub file_name: &'static str,
    pub title: &'static str,
    pub x_desc: &'static str,
    pub y_desc: &'static str,
    pub kind: ChartKind,
    pub bucketing: Bucketing,
    pub order: BucketOrder,
    pub limit: Option<usize>,
    pub color: (u8, u8, u8),
}

/// Named sets of charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportProfile {
    /// Monthly growth, product distribution, weekly performance.
    Investor,
    /// Weekly trend lines and the top products.
    Forecast,
    /// Both of the above.
    #[default]
    Combined,
}

impl ReportProfile {
    pub fn charts(self, top_n: usize) -> Vec<ChartSpec> {
        match self {
            ReportProfile::Investor => investor_charts(),
            ReportProfile::Forecast => forecast_charts(top_n),
            ReportProfile::Combined => {
                let mut charts = investor_charts();
                charts.extend(forecast_charts(top_n));
                charts
            }
        }
    }
}

fn investor_charts() -> Vec<ChartSpec> {
    vec![
        ChartSpec {
            name: "monthly_growth_plot",
            file_name: "monthly_growth_plot.png",
            title: "Monthly Growth",
            x_desc: "Month",
            y_desc: "Revenue",
            kind: ChartKind::Bar,
            bucketing: Bucketing::Month,
            order: BucketOrder::Key,
            limit: None,
            color: (135, 206, 235),
        },
        ChartSpec {
            name: "product_distribution_plot",
            file_name: "product_distribution_plot.png",
            title: "Product Revenue Distribution",
            x_desc: "Total Revenue",
            y_desc: "Product",
            kind: ChartKind::HorizontalBar,
            bucketing: Bucketing::Product,
            order: BucketOrder::RevenueAsc,
            limit: None,
            color: (100, 149, 237),
        },
        ChartSpec {
            name: "sales_performance_plot",
            file_name: "sales_performance_plot.png",
            title: "Weekly Sales Performance",
            x_desc: "Week Starting",
            y_desc: "Total Revenue",
            kind: ChartKind::Line,
            bucketing: Bucketing::Week,
            order: BucketOrder::Key,
            limit: None,
            color: (46, 139, 87),
        },
    ]
}

fn forecast_charts(top_n: usize) -> Vec<ChartSpec> {
    vec![
        ChartSpec {
            name: "forecast_plot",
            file_name: "forecast_plot.png",
            title: "Weekly Sales Trend",
            x_desc: "Week Starting",
            y_desc: "Total Revenue",
            kind: ChartKind::Line,
            bucketing: Bucketing::Week,
            order: BucketOrder::Key,
            limit: None,
            color: (30, 144, 255),
        },
        ChartSpec {
            name: "revenue_time_plot",
            file_name: "revenue_time_plot.png",
            title: "Weekly Revenue Trend",
            x_desc: "Week Starting",
            y_desc: "Total Revenue",
            kind: ChartKind::Line,
            bucketing: Bucketing::Week,
            order: BucketOrder::Key,
            limit: None,
            color: (46, 139, 87),
        },
        ChartSpec {
            name: "top_products_plot",
            file_name: "top_products_plot.png",
            title: "Top Products",
            x_desc: "Product",
            y_desc: "Revenue",
            kind: ChartKind::Bar,
            bucketing: Bucketing::Product,
            order: BucketOrder::RevenueDesc,
            limit: Some(top_n),
            color: (255, 165, 0),
        },
    ]
}

/// Where and how charts are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    /// URL path the output directory is served under (no trailing slash).
    pub url_prefix: String,
    pub width: u32,
    pub height: u32,
    pub top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("static/plots"),
            url_prefix: "/static/plots".to_string(),
            width: 1200,
            height: 700,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl ReportConfig {
    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.url_prefix.trim_end_matches('/'), file_name)
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

/// Chart name → relative URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportOutput {
    pub charts: BTreeMap<String, String>,
}

/// Render every chart in `specs` and return where each one can be fetched.
///
/// Charts are independent and render in parallel. Each one is drawn to a
/// uniquely named temporary file and then renamed over its fixed file name,
/// so a concurrent reader sees either the previous image or the new one.
pub fn render_report(ledger: &SalesLedger, specs: &[ChartSpec], config: &ReportConfig) -> Result<ReportOutput, AppError> {
    fs::create_dir_all(&config.output_dir)?;

    let rendered: Result<Vec<(String, String)>, AppError> = specs
        .par_iter()
        .map(|spec| {
            let buckets = aggregate(ledger, spec.bucketing, spec.order, spec.limit);
            let target = config.path_for(spec.file_name);
            write_chart_atomically(spec, &buckets, &target, (config.width, config.height))?;
            debug!(chart = spec.name, buckets = buckets.len(), "chart rendered");
            Ok((spec.name.to_string(), config.url_for(spec.file_name)))
        })
        .collect();

    let charts: BTreeMap<String, String> = rendered?.into_iter().collect();
    info!(charts = charts.len(), dir = %config.output_dir.display(), "report written");
    Ok(ReportOutput { charts })
}

fn write_chart_atomically(
    spec: &ChartSpec,
    buckets: &[crate::domain::Bucket],
    target: &Path,
    size: (u32, u32),
) -> Result<(), AppError> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| spec.name.to_string());
    // Keep the `.png` extension: the bitmap backend picks the encoder from it.
    let tmp = dir.join(format!(".{stem}-{}.png", Uuid::new_v4().simple()));

    if let Err(message) = chart::draw_chart(spec, buckets, &tmp, size) {
        let _ = fs::remove_file(&tmp);
        return Err(AppError::chart(spec.name, message));
    }

    fs::rename(&tmp, target).inspect_err(|_| {
        let _ = fs::remove_file(&tmp);
    })?;
    Ok(())
}
