//! examlens CLI
//!
//! Commands:
//! - assemble: combine the three analytics payloads into metric sections
//! - calibration: confidence-calibration breakdown from a historical payload
//! - validate: shape-check source payloads

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::DateTime;
use serde_json::json;
use thiserror::Error;

use examlens::bucketizer::Bucketizer;
use examlens::calibration::CalibrationAnalyzer;
use examlens::normalizer::RecordNormalizer;
use examlens::sources::{parse_historical, parse_prediction, parse_statistics};
use examlens::types::{ConfidenceTier, Difficulty};
use examlens::{assemble_metrics, AnalyticsError, TimeRange, ENGINE_VERSION};

/// examlens - Performance analytics aggregation for exam prep dashboards
#[derive(Parser)]
#[command(name = "examlens")]
#[command(author = "MedPrep Labs")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Aggregate exam performance payloads into dashboard metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble metric sections from the three source payloads
    Assemble {
        /// Historical performance payload (JSON file, use - for stdin)
        #[arg(long)]
        historical: PathBuf,

        /// Statistics summary payload (JSON file)
        #[arg(long)]
        statistics: PathBuf,

        /// Prediction payload (JSON file)
        #[arg(long)]
        prediction: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Keep only exams at or after this RFC 3339 cutoff
        #[arg(long, conflicts_with = "last_exams")]
        since: Option<String>,

        /// Keep only the N most recent exams
        #[arg(long)]
        last_exams: Option<usize>,

        /// Force compact JSON even on a terminal
        #[arg(long)]
        compact: bool,
    },

    /// Print the confidence-calibration breakdown for a historical payload
    Calibration {
        /// Historical performance payload (JSON file, use - for stdin)
        #[arg(long)]
        historical: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Force compact JSON even on a terminal
        #[arg(long)]
        compact: bool,
    },

    /// Shape-check any subset of the three source payloads
    Validate {
        /// Historical performance payload to check
        #[arg(long)]
        historical: Option<PathBuf>,

        /// Statistics summary payload to check
        #[arg(long)]
        statistics: Option<PathBuf>,

        /// Prediction payload to check
        #[arg(long)]
        prediction: Option<PathBuf>,

        /// Output the validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error("Invalid --since value: {0}")]
    InvalidSince(String),

    #[error("{0} payload(s) failed validation")]
    ValidationFailed(usize),
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Assemble {
            historical,
            statistics,
            prediction,
            output,
            since,
            last_exams,
            compact,
        } => cmd_assemble(
            &historical,
            &statistics,
            &prediction,
            &output,
            since.as_deref(),
            last_exams,
            compact,
        ),

        Commands::Calibration {
            historical,
            output,
            compact,
        } => cmd_calibration(&historical, &output, compact),

        Commands::Validate {
            historical,
            statistics,
            prediction,
            json,
        } => cmd_validate(
            historical.as_deref(),
            statistics.as_deref(),
            prediction.as_deref(),
            json,
        ),
    }
}

fn cmd_assemble(
    historical: &Path,
    statistics: &Path,
    prediction: &Path,
    output: &Path,
    since: Option<&str>,
    last_exams: Option<usize>,
    compact: bool,
) -> Result<(), CliError> {
    let time_range = match (since, last_exams) {
        (Some(raw), _) => {
            let cutoff = DateTime::parse_from_rfc3339(raw)
                .map_err(|e| CliError::InvalidSince(format!("{raw}: {e}")))?;
            TimeRange::Since(cutoff.with_timezone(&chrono::Utc))
        }
        (None, Some(count)) => TimeRange::LastExams(count),
        (None, None) => TimeRange::All,
    };

    let records = parse_historical(&read_json(historical)?)?;
    let summary = parse_statistics(&read_json(statistics)?)?;
    let predicted = parse_prediction(&read_json(prediction)?)?;

    // All three payloads are present once parsing succeeds, so assembly
    // always yields a populated structure.
    let sections =
        match assemble_metrics(Some(&records), Some(&summary), Some(&predicted), time_range) {
            Some(sections) => sections,
            None => {
                return Err(CliError::Analytics(AnalyticsError::InvalidPayload(
                    "metrics not ready".to_string(),
                )))
            }
        };

    write_json(output, &serde_json::to_value(&sections)?, compact)
}

fn cmd_calibration(historical: &Path, output: &Path, compact: bool) -> Result<(), CliError> {
    let records = parse_historical(&read_json(historical)?)?;
    let ordered = RecordNormalizer::normalize(&records);
    let buckets = Bucketizer::bucketize(&ordered);
    let report = CalibrationAnalyzer::analyze(&buckets);

    let tiers: serde_json::Map<String, serde_json::Value> = ConfidenceTier::ALL
        .iter()
        .map(|&tier| {
            (
                tier.as_str().to_lowercase(),
                json!(CalibrationAnalyzer::tier_series(&buckets, tier)),
            )
        })
        .collect();

    let difficulties: serde_json::Map<String, serde_json::Value> = Difficulty::ALL
        .iter()
        .map(|&difficulty| {
            (
                difficulty.as_str().to_lowercase(),
                json!(CalibrationAnalyzer::difficulty_series(&buckets, difficulty)),
            )
        })
        .collect();

    let payload = json!({
        "report": report,
        "tier_series": tiers,
        "difficulty_series": difficulties,
    });

    write_json(output, &payload, compact)
}

fn cmd_validate(
    historical: Option<&Path>,
    statistics: Option<&Path>,
    prediction: Option<&Path>,
    json_report: bool,
) -> Result<(), CliError> {
    let mut checks: Vec<(&str, Result<String, String>)> = Vec::new();

    if let Some(path) = historical {
        let outcome = read_json(path).map_err(|e| e.to_string()).and_then(|value| {
            parse_historical(&value)
                .map(|records| format!("{} record(s)", records.len()))
                .map_err(|e| e.to_string())
        });
        checks.push(("historical", outcome));
    }

    if let Some(path) = statistics {
        let outcome = read_json(path).map_err(|e| e.to_string()).and_then(|value| {
            parse_statistics(&value)
                .map(|summary| format!("{} score point(s)", summary.exam_dates.len()))
                .map_err(|e| e.to_string())
        });
        checks.push(("statistics", outcome));
    }

    if let Some(path) = prediction {
        let outcome = read_json(path).map_err(|e| e.to_string()).and_then(|value| {
            parse_prediction(&value)
                .map(|p| format!("confidence {:.1}", p.confidence_score))
                .map_err(|e| e.to_string())
        });
        checks.push(("prediction", outcome));
    }

    let failures = checks.iter().filter(|(_, r)| r.is_err()).count();

    if json_report {
        let report: Vec<serde_json::Value> = checks
            .iter()
            .map(|(name, outcome)| match outcome {
                Ok(detail) => json!({"payload": name, "valid": true, "detail": detail}),
                Err(error) => json!({"payload": name, "valid": false, "error": error}),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (name, outcome) in &checks {
            match outcome {
                Ok(detail) => println!("{name}: ok ({detail})"),
                Err(error) => println!("{name}: INVALID ({error})"),
            }
        }
    }

    if failures > 0 {
        return Err(CliError::ValidationFailed(failures));
    }
    Ok(())
}

fn read_json(path: &Path) -> Result<serde_json::Value, CliError> {
    let data = if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&data)?)
}

fn write_json(path: &Path, value: &serde_json::Value, compact: bool) -> Result<(), CliError> {
    if path.to_string_lossy() == "-" {
        // Pretty-print when writing to an interactive terminal.
        if !compact && atty::is(atty::Stream::Stdout) {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", serde_json::to_string(value)?);
        }
    } else {
        fs::write(path, serde_json::to_string_pretty(value)?)?;
    }
    Ok(())
}
