use std::path::Path;

use anyhow::Context as _;
use sgm_shared::telemetry;

use crate::cli::Cli;

const APP_NAME: &str = "sgm_admin_client";
const LOG_FOLDER: &str = "traces";
const DEFAULT_DIRECTIVE: &str = "zbus=warn,info";

/// Logs to a file unless stdout was requested or the file can't be created
pub fn init(cli: &Cli) -> anyhow::Result<()> {
    if !cli.is_to_std_out {
        match telemetry::init_file_subscriber(Path::new(LOG_FOLDER), APP_NAME, DEFAULT_DIRECTIVE) {
            Ok(path) => {
                println!("Tracing started to file {path:?}");
                return Ok(());
            }
            // Fall through to stdout
            Err(e) => eprintln!("Failed to start logging to file: {e:?}"),
        }
    }

    tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to start tracing to stdout")
}
