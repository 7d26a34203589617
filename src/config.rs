//! Command-line configuration. Everything has a default so a bare
//! `counter-desk billing` behaves like the classic tool: reports land in the
//! working directory, logs under the user's home.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".counter-desk";
/// Log folder inside the application data directory.
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Parser)]
#[command(name = "counter-desk", version, about = "Billing and library record desks")]
pub struct Cli {
    /// Directory where bill.txt, books.txt and admin_alerts.txt are written.
    #[arg(long, default_value = ".")]
    pub report_dir: PathBuf,

    /// Directory for the rolling log file. Defaults to ~/.counter-desk/logs.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Username accepted by the login screen.
    #[arg(long, default_value = "admin")]
    pub username: String,

    /// Password accepted by the login screen.
    #[arg(long, env = "COUNTER_DESK_PASSWORD", default_value = "sathya", hide_env_values = true)]
    pub password: String,

    #[command(subcommand)]
    pub desk: DeskKind,
}

/// Which desk the front-end opens after login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum DeskKind {
    /// Point-of-sale bill with a running total.
    Billing,
    /// Book loans, overdue list and book catalog.
    Library,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub desk: DeskKind,
    pub report_dir: PathBuf,
    pub log_dir: PathBuf,
    pub username: String,
    pub password: String,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let log_dir = match cli.log_dir {
            Some(dir) => dir,
            None => default_log_dir()?,
        };
        Ok(Self {
            desk: cli.desk,
            report_dir: cli.report_dir,
            log_dir,
            username: cli.username,
            password: cli.password,
        })
    }
}

/// Resolve `~/.counter-desk/logs`.
fn default_log_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs
        .home_dir()
        .join(DATA_DIR_NAME)
        .join(LOG_DIR_NAME))
}
