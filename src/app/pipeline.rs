//! Shared "analysis pipeline" logic used by both the CLI and the HTTP handlers.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> validation -> aggregation -> chart rendering
//!
//! The CLI and the server can then focus on presentation (printing vs JSON).

use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::aggregate::{LedgerSummary, summarize};
use crate::error::AppError;
use crate::io::ingest::{IngestOptions, IngestedLedger, load_ledger, read_ledger};
use crate::report::{ReportConfig, ReportOutput, ReportProfile, render_report};

/// Inputs shared by every pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub ingest: IngestOptions,
    pub report: ReportConfig,
    /// When false, aggregation still runs but no chart files are touched.
    pub render_charts: bool,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub ingest: IngestedLedger,
    pub summary: LedgerSummary,
    pub report: ReportOutput,
}

/// Run the pipeline over a CSV file on disk.
pub fn run_analysis_from_path(path: &Path, profile: ReportProfile, options: &PipelineOptions) -> Result<AnalysisRun, AppError> {
    info!(file = %path.display(), ?profile, "analyzing sales file");
    let ingest = load_ledger(path, options.ingest)?;
    finish(ingest, profile, options)
}

/// Run the pipeline over any CSV byte source.
pub fn run_analysis<R: Read>(source: R, profile: ReportProfile, options: &PipelineOptions) -> Result<AnalysisRun, AppError> {
    let ingest = read_ledger(source, options.ingest)?;
    finish(ingest, profile, options)
}

// Ingest has already rejected schema problems and empty ledgers, so nothing is
// rendered for invalid input.
fn finish(ingest: IngestedLedger, profile: ReportProfile, options: &PipelineOptions) -> Result<AnalysisRun, AppError> {
    let summary = summarize(&ingest, options.report.top_n);

    let report = if options.render_charts {
        let specs = profile.charts(options.report.top_n);
        render_report(&ingest.ledger, &specs, &options.report)?
    } else {
        ReportOutput::default()
    };

    Ok(AnalysisRun {
        ingest,
        summary,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RevenuePolicy;
    use crate::error::ValidationError;
    use rust_decimal::Decimal;

    const SCENARIO: &str = "Date,Product,Revenue\n2023-01-02,Widget,100\n2023-01-09,Widget,50\n2023-01-02,Gadget,30\n";

    fn options(dir: &Path, render_charts: bool) -> PipelineOptions {
        PipelineOptions {
            ingest: IngestOptions::default(),
            report: ReportConfig {
                output_dir: dir.to_path_buf(),
                width: 400,
                height: 300,
                ..ReportConfig::default()
            },
            render_charts,
        }
    }

    #[test]
    fn forecast_run_produces_summary_and_charts() {
        let dir = tempfile::tempdir().unwrap();
        let run = run_analysis(SCENARIO.as_bytes(), ReportProfile::Forecast, &options(dir.path(), true)).unwrap();

        assert_eq!(run.summary.total_revenue, Decimal::from(180));
        assert_eq!(run.summary.weekly.len(), 2);
        assert_eq!(run.summary.top_products[0].label, "Widget");

        let names: Vec<&str> = run.report.charts.keys().map(String::as_str).collect();
        assert_eq!(names, ["forecast_plot", "revenue_time_plot", "top_products_plot"]);
        assert!(dir.path().join("top_products_plot.png").is_file());
    }

    #[test]
    fn summary_only_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("plots");
        let run = run_analysis(SCENARIO.as_bytes(), ReportProfile::Combined, &options(&out, false)).unwrap();

        assert!(run.report.charts.is_empty());
        assert!(!out.exists());
    }

    #[test]
    fn invalid_input_renders_no_charts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("plots");
        let csv = "Date,Product,Amount\n2023-01-02,Widget,100\n";

        let err = run_analysis(csv.as_bytes(), ReportProfile::Investor, &options(&out, true)).unwrap_err();

        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MissingColumns(ref cols)) if cols == &["Revenue".to_string()]
        ));
        assert!(!out.exists());
    }

    #[test]
    fn path_variant_honors_lenient_policy() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("sales.csv");
        std::fs::write(&csv_path, "Date,Product,Revenue\n2023-01-02,A,10\n2023-01-03,B,n/a\n").unwrap();

        let mut opts = options(&dir.path().join("plots"), false);
        opts.ingest.revenue_policy = RevenuePolicy::Lenient;
        let run = run_analysis_from_path(&csv_path, ReportProfile::Investor, &opts).unwrap();

        assert_eq!(run.summary.rows_used, 1);
        assert_eq!(run.summary.rows_dropped, 1);

        opts.ingest.revenue_policy = RevenuePolicy::Strict;
        assert!(run_analysis_from_path(&csv_path, ReportProfile::Investor, &opts).is_err());
    }
}
