use crate::api::DEFAULT_BASE_URL;
use crate::metric::MetricKind;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Terminal COVID-19 dashboard
#[derive(Debug, Parser)]
#[command(name = "covid-map", version, about)]
pub struct Args {
    /// Base URL of the disease.sh COVID-19 API
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Directory holding Natural Earth GeoJSON files
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Days of worldwide history shown in the chart
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u32).range(2..))]
    pub history_days: u32,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Metric selected at startup (cases, recovered, deaths)
    #[arg(long, default_value = "cases")]
    pub metric: MetricKind,

    /// Write logs to this file (filtered by RUST_LOG, default info)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Set up file logging. The terminal belongs to the UI, so without a log
/// file nothing is recorded. Keep the guard alive until exit.
pub fn init_logging(log_file: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    let Some(path) = log_file else {
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("log file path {} has no file name", path.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;

    Ok(Some(guard))
}
