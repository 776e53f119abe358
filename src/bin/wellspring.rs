//! Wellspring CLI - Command-line interface for the Wellspring engine
//!
//! Every data command reads a snapshot JSON document (factors, behavioral
//! entries, wellbeing entries) and prints a report envelope on stdout.
//!
//! Commands:
//! - correlations: Factor × metric correlation sweep
//! - lag: Same-day, next-day and two-day correlations for one pair
//! - streak: Completion statistics for one factor
//! - trend: Daily metric values with a moving average
//! - summary: Per-metric averages
//! - heatmap: One year of a factor's completions
//! - validate: Report out-of-range values and dangling factor references
//! - metrics: Print the metric registry

use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use wellspring::lag::DEFAULT_LAG_METRIC;
use wellspring::metrics::registry;
use wellspring::report::ReportEncoder;
use wellspring::{
    AnalysisConfig, AnalysisError, DateRange, FactorId, InsightsEngine, MissingValuePolicy,
    Snapshot, SweepFilters, WellbeingMetric, ENGINE_VERSION,
};

/// Wellspring - find out which habits move your mood
#[derive(Parser)]
#[command(name = "wellspring")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Correlate daily habits with wellbeing scores", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// First day to include (YYYY-MM-DD)
    #[arg(long, global = true)]
    start: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long, global = true)]
    end: Option<NaiveDate>,

    /// Analysis configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log filter for stderr, e.g. "debug" or "wellspring=trace" (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Correlate every factor with every wellbeing metric
    Correlations {
        /// Snapshot file path (use - for stdin)
        input: PathBuf,

        /// Only this metric (e.g. mood_score)
        #[arg(long)]
        metric: Option<String>,

        /// Only this factor id
        #[arg(long)]
        factor: Option<i64>,

        /// Minimum aligned days per pair
        #[arg(long)]
        min_samples: Option<usize>,

        /// Results kept per metric
        #[arg(long)]
        top_n: Option<usize>,

        /// Drop days the factor was not tracked instead of counting them as not completed
        #[arg(long)]
        exclude_untracked: bool,
    },

    /// Correlations at 0, 1 and 2 days of delay for one factor and metric
    Lag {
        /// Snapshot file path (use - for stdin)
        input: PathBuf,

        /// Factor id
        #[arg(long)]
        factor: i64,

        /// Metric name (defaults to mood_score)
        #[arg(long)]
        metric: Option<String>,
    },

    /// Completion rate and streaks for one factor
    Streak {
        /// Snapshot file path (use - for stdin)
        input: PathBuf,

        /// Factor id
        #[arg(long)]
        factor: i64,

        /// Reference day for the current streak (defaults to today, UTC)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Daily values of one metric with a moving average
    Trend {
        /// Snapshot file path (use - for stdin)
        input: PathBuf,

        /// Metric name
        #[arg(long)]
        metric: String,

        /// Moving-average window in days with data
        #[arg(long)]
        window: Option<usize>,
    },

    /// Average of every metric over the range
    Summary {
        /// Snapshot file path (use - for stdin)
        input: PathBuf,
    },

    /// One calendar year of completions for one factor
    Heatmap {
        /// Snapshot file path (use - for stdin)
        input: PathBuf,

        /// Factor id
        #[arg(long)]
        factor: i64,

        /// Calendar year (defaults to the current year, UTC)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Check a snapshot for data problems
    Validate {
        /// Snapshot file path (use - for stdin)
        input: PathBuf,
    },

    /// Print the wellbeing metric registry
    Metrics,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<(), WellspringCliError> {
    let range = DateRange::new(cli.start, cli.end)?;
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_json(&fs::read_to_string(path)?)?,
        None => AnalysisConfig::default(),
    };
    let output = Output {
        encoder: ReportEncoder::new(),
        range,
        pretty: cli.pretty,
    };

    match cli.command {
        Commands::Correlations {
            input,
            metric,
            factor,
            min_samples,
            top_n,
            exclude_untracked,
        } => {
            if let Some(min_samples) = min_samples {
                config = config.with_sweep_min_samples(min_samples);
            }
            if let Some(top_n) = top_n {
                config = config.with_top_n(top_n);
            }
            if exclude_untracked {
                config = config.with_missing_value_policy(MissingValuePolicy::ExcludeUntracked);
            }
            let filters = SweepFilters {
                metric: metric
                    .as_deref()
                    .map(str::parse::<WellbeingMetric>)
                    .transpose()?,
                factor: factor.map(FactorId),
            };

            let engine = InsightsEngine::with_config(config)?;
            let store = load_snapshot(&input)?;
            output.emit(engine.correlations(&store, range, &filters)?)
        }

        Commands::Lag {
            input,
            factor,
            metric,
        } => {
            let metric = parse_metric_or(metric.as_deref(), DEFAULT_LAG_METRIC)?;
            let engine = InsightsEngine::with_config(config)?;
            let store = load_snapshot(&input)?;
            output.emit(engine.lag_profile(&store, FactorId(factor), metric, range)?)
        }

        Commands::Streak {
            input,
            factor,
            today,
        } => {
            let today = today.unwrap_or_else(|| Utc::now().date_naive());
            let engine = InsightsEngine::with_config(config)?;
            let store = load_snapshot(&input)?;
            output.emit(engine.streak_stats(&store, FactorId(factor), today)?)
        }

        Commands::Trend {
            input,
            metric,
            window,
        } => {
            let metric: WellbeingMetric = metric.parse()?;
            if let Some(window) = window {
                config.trend_window = window;
            }
            let engine = InsightsEngine::with_config(config)?;
            let store = load_snapshot(&input)?;
            output.emit(engine.metric_trend(&store, metric, range)?)
        }

        Commands::Summary { input } => {
            let engine = InsightsEngine::with_config(config)?;
            let store = load_snapshot(&input)?;
            output.emit(engine.metric_summary(&store, range)?)
        }

        Commands::Heatmap {
            input,
            factor,
            year,
        } => {
            let year = year.unwrap_or_else(|| Utc::now().year());
            let engine = InsightsEngine::with_config(config)?;
            let store = load_snapshot(&input)?;
            output.emit(engine.heatmap(&store, FactorId(factor), year)?)
        }

        Commands::Validate { input } => cmd_validate(&input, cli.pretty),

        Commands::Metrics => {
            println!("{}", to_json(&registry(), cli.pretty)?);
            Ok(())
        }
    }
}

fn cmd_validate(input: &Path, pretty: bool) -> Result<(), WellspringCliError> {
    let store = load_snapshot(input)?;
    let issues = store.validate();

    let report = ValidationReport {
        factors: store.factors.len(),
        behavioral_entries: store.behavioral_entries.len(),
        wellbeing_entries: store.wellbeing_entries.len(),
        issue_count: issues.len(),
        issues,
    };
    println!("{}", to_json(&report, pretty)?);

    if report.issue_count > 0 {
        Err(WellspringCliError::ValidationFailed(report.issue_count))
    } else {
        Ok(())
    }
}

fn parse_metric_or(
    name: Option<&str>,
    default: WellbeingMetric,
) -> Result<WellbeingMetric, AnalysisError> {
    name.map_or(Ok(default), str::parse)
}

fn load_snapshot(input: &Path) -> Result<Snapshot, WellspringCliError> {
    let data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };
    let store = Snapshot::from_json(&data)?;

    tracing::debug!(
        factors = store.factors.len(),
        behavioral_entries = store.behavioral_entries.len(),
        wellbeing_entries = store.wellbeing_entries.len(),
        "Snapshot loaded"
    );

    Ok(store)
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

struct Output {
    encoder: ReportEncoder,
    range: DateRange,
    pretty: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, payload: T) -> Result<(), WellspringCliError> {
        println!(
            "{}",
            self.encoder.encode_to_json(payload, self.range, self.pretty)?
        );
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum WellspringCliError {
    Io(io::Error),
    Analysis(AnalysisError),
    Json(serde_json::Error),
    ValidationFailed(usize),
}

impl From<io::Error> for WellspringCliError {
    fn from(e: io::Error) -> Self {
        WellspringCliError::Io(e)
    }
}

impl From<AnalysisError> for WellspringCliError {
    fn from(e: AnalysisError) -> Self {
        WellspringCliError::Analysis(e)
    }
}

impl From<serde_json::Error> for WellspringCliError {
    fn from(e: serde_json::Error) -> Self {
        WellspringCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<WellspringCliError> for CliError {
    fn from(e: WellspringCliError) -> Self {
        match e {
            WellspringCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            WellspringCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            WellspringCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} data issues found", count),
                hint: Some("Fix the reported entries and retry".to_string()),
            },
            WellspringCliError::Analysis(e) => {
                let message = e.to_string();
                let (code, hint) = match e {
                    AnalysisError::UnknownMetric(_) => (
                        "UNKNOWN_METRIC",
                        Some("Run 'wellspring metrics' for valid names".to_string()),
                    ),
                    AnalysisError::UnknownFactor(_) => (
                        "UNKNOWN_FACTOR",
                        Some("Check the factor id against the snapshot".to_string()),
                    ),
                    AnalysisError::InvalidDateRange { .. } => (
                        "INVALID_DATE_RANGE",
                        Some("--start must not be after --end".to_string()),
                    ),
                    AnalysisError::InvalidConfig(_) => ("INVALID_CONFIG", None),
                    AnalysisError::InvalidEntry(_) => ("INVALID_ENTRY", None),
                    AnalysisError::Storage(_) => ("STORAGE_ERROR", None),
                    AnalysisError::JsonError(_) => (
                        "PARSE_ERROR",
                        Some("Ensure input is a snapshot with factors and entries".to_string()),
                    ),
                };
                CliError {
                    code: code.to_string(),
                    message,
                    hint,
                }
            }
        }
    }
}

// Report types

#[derive(Serialize)]
struct ValidationReport {
    factors: usize,
    behavioral_entries: usize,
    wellbeing_entries: usize,
    issue_count: usize,
    issues: Vec<wellspring::store::DataIssue>,
}
