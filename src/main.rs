mod api;
mod cli;
mod client;
mod config;
mod multipart;

use clap::Parser;
use cli::Cli;
use indicatif::MultiProgress;
use log::{error, LevelFilter};

/// Install a stderr logger that cooperates with the upload spinner, and
/// return the progress bar collection it's bound to.
fn init_logging(level: LevelFilter) -> Result<MultiProgress, log::SetLoggerError> {
    let env_logger = env_logger::Builder::new()
        .filter_level(level)
        .format_file(false)
        .format_target(false)
        .format_timestamp(None)
        .build();

    let progress = MultiProgress::new();
    indicatif_log_bridge::LogWrapper::new(progress.clone(), env_logger)
        .try_init()?;
    Ok(progress)
}

fn main() {
    // PAPERLESS_API_KEY may live in a .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let progress = match init_logging(cli.verbose.log_level_filter()) {
        Ok(progress) => progress,
        Err(err) => {
            eprintln!("Failed to initialize logging: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = cli.run(&progress) {
        error!("{err}");
        std::process::exit(1);
    }
}
