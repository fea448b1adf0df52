use std::io;
use std::path::Path;

use clap::Parser;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tdpiper::{TDPipeError, TDPiper};

fn log_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy()
}

fn init_logging(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let registry = tracing_subscriber::registry().with(
        fmt::layer()
            .compact()
            .with_writer(io::stderr)
            .with_filter(log_filter()),
    );
    let guard = if let Some(path) = log_file {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "tdpiper.log".into());
        let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
        registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(log_filter()),
            )
            .init();
        Some(guard)
    } else {
        registry.init();
        None
    };
    if let Err(e) = LogTracer::init() {
        warn!("Failed to route log records through tracing: {e}");
    }
    guard
}

fn main() -> Result<(), TDPipeError> {
    let args = TDPiper::parse().layered()?;
    let _guard = init_logging(args.log_file.as_deref());
    args.main()?;
    Ok(())
}
