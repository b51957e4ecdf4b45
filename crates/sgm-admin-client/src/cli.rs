use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(
        short = 's',
        long = "stdout",
        action,
        help = "Controls if it logs to stdout/stderr instead of to a file"
    )]
    pub is_to_std_out: bool,

    #[arg(
        short = 'c',
        long = "config-dir",
        default_value = "configuration",
        help = "Folder containing base.toml and the per environment settings"
    )]
    pub config_dir: PathBuf,

    #[arg(
        long = "server",
        help = "Overrides the configured server address for this run"
    )]
    pub server_address: Option<String>,
}
