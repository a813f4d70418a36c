//! CLI entry point for the ride report tool.
//!
//! `analyze` runs the full pipeline and writes CSV exports, charts and a PDF
//! report; `summary` only logs the scalar summary of the cleaned table.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ride_report::config::AnalysisConfig;
use ride_report::output::{print_json, print_pretty};
use ride_report::pipeline;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ride_report")]
#[command(about = "Batch analysis and reporting for ride-booking logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a ride log and write CSV exports, charts and a PDF report
    Analyze {
        /// Ride log CSV to analyze
        #[arg(short, long, env = "RIDE_INPUT_PATH")]
        input: Option<PathBuf>,

        /// Directory for every output artifact
        #[arg(short, long, env = "RIDE_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// JSON config file; CLI flags override its values
        #[arg(short, long, env = "RIDE_CONFIG")]
        config: Option<PathBuf>,

        /// Seed for the scatter-plot sample
        #[arg(long)]
        seed: Option<u64>,

        /// Entries kept in the top pickup/dropoff views
        #[arg(long)]
        top_n: Option<usize>,

        /// Maximum rows drawn in the scatter plot
        #[arg(long)]
        sample_size: Option<usize>,
    },
    /// Log the scalar summary of a ride log without writing any files
    Summary {
        /// Ride log CSV to summarize
        #[arg(short, long, env = "RIDE_INPUT_PATH")]
        input: Option<PathBuf>,

        /// JSON config file
        #[arg(short, long, env = "RIDE_CONFIG")]
        config: Option<PathBuf>,

        /// Log the summary as JSON instead of debug format
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ride_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ride_report.log"));

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

    match cli.command {
        Commands::Analyze {
            input,
            output_dir,
            config,
            seed,
            top_n,
            sample_size,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(input) = input {
                config.input_path = input;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(seed) = seed {
                config.sample_seed = seed;
            }
            if let Some(n) = top_n {
                config.top_n = n;
            }
            if let Some(n) = sample_size {
                config.sample_size = n;
            }

            let outputs = pipeline::run(&config)?;

            info!(path = %outputs.exported.cleaned.display(), "Cleaned data saved");
            info!(path = %outputs.exported.summary.display(), "Summary metrics saved");
            info!(path = %outputs.report.display(), "PDF report saved");
            info!(dir = %outputs.output_dir.display(), "All outputs saved");
        }
        Commands::Summary {
            input,
            config,
            json,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(input) = input {
                config.input_path = input;
            }

            let summary = pipeline::summarize(&config)?;
            if json {
                print_json(&summary)?;
            } else {
                print_pretty(&summary);
            }
        }
    }

    Ok(())
}

/// Reads the JSON config when one is given, otherwise the defaults.
fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading config");
            AnalysisConfig::load(path)
        }
        None => Ok(AnalysisConfig::default()),
    }
}
