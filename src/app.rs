//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs logging
//! - parses CLI arguments
//! - runs the HTTP service or a one-shot analysis
//! - writes templates, samples and optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{AnalyzeArgs, Command, SampleArgs, ServeArgs, TemplateArgs};
use crate::config::{ServerConfig, ingest_options_from_args, report_config_from_args};
use crate::data::{SampleConfig, write_sample_csv};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `localboost` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env file is fine; flags and real env vars still apply.
    let _ = dotenvy::dotenv();
    crate::logging::init_logging();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Serve(args) => handle_serve(args),
        Command::Analyze(args) => handle_analyze(args),
        Command::Template(args) => handle_template(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_serve(args: ServeArgs) -> Result<(), AppError> {
    let config = ServerConfig::from_args(&args)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(crate::server::serve(config))
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let path = match &args.csv {
        Some(path) => crate::cli::picker::validate_csv_path(path)?,
        None => crate::cli::picker::prompt_for_csv_path()?,
    };

    let options = pipeline::PipelineOptions {
        ingest: ingest_options_from_args(&args.report),
        report: report_config_from_args(&args.report)?,
        render_charts: !args.no_charts,
    };
    let run = pipeline::run_analysis_from_path(&path, args.profile, &options)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.summary, &run.ingest.dropped, &run.report)
    );

    // Optional export.
    if let Some(export) = &args.export {
        crate::io::export::write_summary_json(export, &run.summary)?;
        info!(file = %export.display(), "summary exported");
    }

    Ok(())
}

fn handle_template(args: TemplateArgs) -> Result<(), AppError> {
    crate::io::template::write_upload_template(&args.out)?;
    println!("Wrote upload template to {}", args.out.display());
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        start: args.start,
        end: args.end,
        seed: args.seed,
        ..SampleConfig::default()
    };
    let rows = write_sample_csv(&args.out, &config)?;
    println!("Wrote {rows} sample rows to {}", args.out.display());
    Ok(())
}
