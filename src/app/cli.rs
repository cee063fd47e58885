//! Command-line arguments
//!
//! Flags mirror the config file keys; anything given here overrides the file.

use crate::core::config::ConfigOverrides;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "plugdepot",
    version,
    about = "Remote plugin repository sync and lifecycle management service"
)]
pub struct Args {
    /// Path to the TOML config file (default: ./plugdepot.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address the HTTP server binds to, e.g. 127.0.0.1:8090
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<String>,

    /// Directory holding plugin artifacts
    #[arg(long, value_name = "DIR")]
    pub plugins_dir: Option<PathBuf>,

    /// Root directory for service state (config, storage, logs)
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log level spec, e.g. "info" or "warn,plugdepot=debug"
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            config: self.config,
            listen: self.listen,
            plugins_dir: self.plugins_dir,
            data_dir: self.data_dir,
            log_level: self.log_level,
            log_file: self.log_file,
        }
    }
}
