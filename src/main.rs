//! CLI entry point for the sentiment rater.
//!
//! Loads per-subject tweet CSVs, scores them, prints the ranked summary
//! and the eviction prediction, and writes ratings artifacts for the
//! chart consumers.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use sentiment_rater::coordinator::AnalysisCoordinator;
use sentiment_rater::{Config, output};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "sentiment_rater")]
#[command(about = "Ranks subjects by tweet sentiment and predicts the next eviction", long_about = None)]
struct Cli {
    /// Directory containing one tweet CSV per subject
    #[arg(short, long, default_value = Config::DEFAULT_DATA_PATH)]
    data_path: PathBuf,

    /// Directory for ratings artifacts
    #[arg(short, long, default_value = Config::DEFAULT_OUTPUT_PATH)]
    output_path: PathBuf,

    /// Do not print the ranked summary or prediction
    #[arg(long, default_value_t = false)]
    no_display: bool,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok(); // Load .env file

    let cli = Cli::parse();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/sentiment_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("sentiment_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if cli.verbose { "debug" } else { "info" };

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive(default_level.parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let config = Config::new(cli.data_path, cli.output_path);
    info!(
        data_path = %config.data_path.display(),
        output_path = %config.output_path.display(),
        "Starting sentiment rater"
    );

    let coordinator = AnalysisCoordinator::with_defaults(config);

    match coordinator.run_analysis() {
        Ok(result) => {
            if !cli.no_display {
                output::print_summary(&result);

                match coordinator.get_eviction_prediction(&result) {
                    Some((subject, rating)) => {
                        println!(
                            "PREDICTION: {subject} is most likely to be evicted ({rating:.2}% rating)"
                        );
                    }
                    None => println!("No prediction available"),
                }
            }

            info!("Analysis completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Analysis failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
