//! CLI entry point for the peer-grading core.
//!
//! Stands in for the orchestration layer: reads collaborator row exports,
//! aggregates them, and logs the resulting decisions. Also exposes the
//! file-type policy checks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use peer_grading::aggregators::{group_reviewer_rows, group_submission_rows};
use peer_grading::config::GradingConfig;
use peer_grading::output::{DecisionRecord, Subject, append_record};
use peer_grading::parser::{load_assessment_rows, load_reviewer_rows};
use std::ffi::OsStr;
use std::path::Path;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "peer_grading")]
#[command(about = "Aggregate peer-assessment grades and check file types", long_about = None)]
struct Cli {
    /// JSON config file (overrides PEER_GRADING_CONFIG)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate submission grades from an assessment CSV export
    Submissions {
        /// CSV with submission_id,submission_grade,weight,grade
        #[arg(value_name = "CSV")]
        source: String,

        /// CSV file to append decisions to
        #[arg(short, long, default_value = "decisions.csv")]
        output: String,
    },
    /// Aggregate reviewer grading grades from a CSV export
    Reviewers {
        /// CSV with reviewer_id,grading_grade,grading_grade_override,
        /// existing_aggregation_id,existing_aggregated_grade
        #[arg(value_name = "CSV")]
        source: String,

        /// Activity the aggregation records belong to
        #[arg(short, long)]
        module_id: u64,

        /// CSV file to append decisions to
        #[arg(short, long, default_value = "decisions.csv")]
        output: String,
    },
    /// Print the canonical form of an extension list
    CleanExtensions {
        #[arg(value_name = "SPEC")]
        spec: String,
    },
    /// List extensions of SUBJECT not permitted by --allowed
    InvalidExtensions {
        #[arg(value_name = "SUBJECT")]
        subject: String,

        #[arg(short, long, default_value = "")]
        allowed: String,
    },
    /// Check a file name against an extension list
    CheckFile {
        #[arg(value_name = "FILENAME")]
        filename: String,

        #[arg(short, long, default_value = "")]
        allowed: String,
    },
}

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/peer_grading.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("peer_grading.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GradingConfig::load(path),
        None => GradingConfig::from_env(),
    }
    .context("Failed to load grading config")?;

    match cli.command {
        Commands::Submissions { source, output } => {
            aggregate_submissions(&config, &source, &output)?;
        }
        Commands::Reviewers {
            source,
            module_id,
            output,
        } => {
            aggregate_reviewers(&config, &source, module_id, &output)?;
        }
        Commands::CleanExtensions { spec } => {
            println!("{}", config.extension_policy().clean(spec.as_str()));
        }
        Commands::InvalidExtensions { subject, allowed } => {
            let invalid = config
                .extension_policy()
                .invalid(subject.as_str(), allowed.as_str());
            for token in &invalid {
                println!("{}", token.without_dot());
            }
            if !invalid.is_empty() {
                warn!(count = invalid.len(), "Extensions not permitted");
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::CheckFile { filename, allowed } => {
            let policy = config.extension_policy();
            if policy.is_allowed(&filename, allowed.as_str()) {
                info!(filename = %filename, "File type allowed");
            } else {
                warn!(
                    filename = %filename,
                    allowed = %policy.clean(allowed.as_str()),
                    "File type not allowed"
                );
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Aggregates every submission in an assessment export and logs the decisions.
#[tracing::instrument(skip(config))]
fn aggregate_submissions(config: &GradingConfig, source: &str, output: &str) -> Result<()> {
    let rows = load_assessment_rows(source)
        .with_context(|| format!("Failed to read assessment rows from '{source}'"))?;
    let batches = group_submission_rows(rows)?;
    let aggregator = config.aggregator();

    let mut changed = 0;
    for batch in &batches {
        let decision = aggregator.aggregate_submission_grades(batch, None);
        if !decision.is_no_action() {
            changed += 1;
        }
        append_record(
            output,
            &DecisionRecord::new(Subject::Submission, batch.submission_id, &decision),
        )?;
    }

    info!(batches = batches.len(), changed, "Submission aggregation complete");
    Ok(())
}

/// Aggregates every reviewer in a grading-grade export and logs the decisions.
#[tracing::instrument(skip(config))]
fn aggregate_reviewers(
    config: &GradingConfig,
    source: &str,
    module_id: u64,
    output: &str,
) -> Result<()> {
    let rows = load_reviewer_rows(source)
        .with_context(|| format!("Failed to read reviewer rows from '{source}'"))?;
    let batches = group_reviewer_rows(module_id, rows)?;
    let aggregator = config.aggregator();

    let mut changed = 0;
    for batch in &batches {
        let decision = aggregator.aggregate_reviewer_grades(batch, None);
        if !decision.is_no_action() {
            changed += 1;
        }
        append_record(
            output,
            &DecisionRecord::new(Subject::Reviewer, batch.reviewer_id, &decision),
        )?;
    }

    info!(batches = batches.len(), changed, "Reviewer aggregation complete");
    Ok(())
}
