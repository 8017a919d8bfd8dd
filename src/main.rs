use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use oasis_provider::plugin;
use oasis_provider::resource::Provider;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Oasis provider plugin; speaks newline-delimited JSON on stdin/stdout
#[derive(Parser, Debug)]
#[command(name = "terraform-provider-oasis", version, about, long_about = None)]
struct Args {
    /// Log level for debugging (falls back to TF_LOG)
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    /// Log file (falls back to TF_LOG_PATH)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }

    /// Level from `--log-level`, then TF_LOG, else off
    fn resolve(flag: Option<LogLevel>) -> LogLevel {
        flag.or_else(|| {
            std::env::var("TF_LOG")
                .ok()
                .and_then(|v| LogLevel::from_str(v.trim(), true).ok())
        })
        .unwrap_or(LogLevel::Off)
    }
}

fn setup_logging(args: &Args) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let level = LogLevel::resolve(args.log_level);
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = args.log_file.clone().unwrap_or_else(get_log_path);

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // stdout carries the host protocol; logs only ever go to the file
    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!(
        "terraform-provider-oasis {} started with log level: {:?}",
        oasis_provider::VERSION,
        level
    );
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(path) = std::env::var_os("TF_LOG_PATH").filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    if let Some(cache_dir) = dirs::cache_dir() {
        return cache_dir.join("terraform-provider-oasis").join("provider.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".terraform-provider-oasis").join("provider.log");
    }
    PathBuf::from("terraform-provider-oasis.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(&args)?;

    let provider = Arc::new(Provider::new());
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    plugin::serve(provider, stdin, tokio::io::stdout())
        .await
        .context("host connection failed")?;

    tracing::info!("Host closed the connection; exiting");
    Ok(())
}
