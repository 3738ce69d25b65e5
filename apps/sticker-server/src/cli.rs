//! Command-line arguments for the `sticker-server` binary.

use std::path::PathBuf;

use clap::Parser;

/// Serial-sticker printing service for the production line.
///
/// Everything except the config file location lives in the TOML file or in
/// `STICKER_*` environment variables.
#[derive(Parser, Debug, Clone)]
#[command(name = "sticker-server", version)]
pub struct CliArgs {
    /// Path to the TOML config file.
    ///
    /// Without it the platform config directory is tried, and built-in
    /// defaults are used when no file is there.
    ///
    /// Environment variable: `STICKER_CONFIG`
    #[arg(short, long, env = "STICKER_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}
