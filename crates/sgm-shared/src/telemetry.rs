//! Structured logging setup for the SGM front ends

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt as _, EnvFilter, Registry};

/// Bunyan formatted JSON written to `sink`
///
/// `RUST_LOG` takes precedence over `default_directive` when it is set
pub fn get_subscriber<Sink>(
    app_name: &str,
    default_directive: &str,
    sink: Sink,
) -> impl tracing::Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(app_name.to_string(), sink))
}

/// Installs `subscriber` globally and forwards `log` records to it
///
/// Can only succeed once per process
pub fn init_subscriber(subscriber: impl tracing::Subscriber + Send + Sync) -> anyhow::Result<()> {
    tracing_log::LogTracer::init().context("log records are already being captured")?;
    tracing::subscriber::set_global_default(subscriber)
        .context("a global subscriber is already set")
}

/// Starts logging to a new file in `log_folder` and returns the file's path
pub fn init_file_subscriber(
    log_folder: &Path,
    app_name: &str,
    default_directive: &str,
) -> anyhow::Result<PathBuf> {
    let (file, path) = create_trace_file(log_folder, app_name)?;
    init_subscriber(get_subscriber(app_name, default_directive, file))?;
    Ok(path)
}

fn trace_file_name(app_name: &str, started_at: chrono::DateTime<chrono::Local>) -> String {
    format!("{app_name}_{}.log", started_at.format("%Y%m%d_%H%M%S"))
}

fn create_trace_file(log_folder: &Path, app_name: &str) -> anyhow::Result<(File, PathBuf)> {
    std::fs::create_dir_all(log_folder)
        .with_context(|| format!("unable to create log folder {}", log_folder.display()))?;
    let path = log_folder.join(trace_file_name(app_name, chrono::Local::now()));
    let file = File::create(&path)
        .with_context(|| format!("unable to create log file {}", path.display()))?;
    Ok((file, path))
}
