//! Binary entry point: parse the command line, start file logging, then hand
//! the terminal to the TUI until the user exits.
use clap::Parser;
use counter_desk::{logging, run_app, App, Cli, Config, StaticCredentials};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = Config::from_cli(Cli::parse())?;
    let _log_guard = logging::init(&config.log_dir)?;
    info!(desk = ?config.desk, report_dir = %config.report_dir.display(), "starting");

    let verifier = StaticCredentials::new(config.username.clone(), config.password.clone());
    let mut app = App::new(&config, Box::new(verifier));
    run_app(&mut app)
}
