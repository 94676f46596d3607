use crate::{
    api::{ApiConfig, Outcome, UploadRequest},
    cli::spinner::Spinner,
    client::Client,
    config::Config,
};
use anyhow::Context;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use indicatif::MultiProgress;
use log::{debug, error, info};
use std::path::{Path, PathBuf};

mod spinner;

// Default values for CLI options
const DEFAULT_ENDPOINT: &str = "http://localhost:8000";
const DEFAULT_API_VERSION: u32 = 9;

/// Upload documents to a Paperless document-management server.
///
/// Files are uploaded one at a time. The first failure stops the run.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path(s) of the file(s) to upload.
    #[arg(value_name = "FILE", required_unless_present("setup"))]
    pub files: Vec<PathBuf>,

    /// The API endpoint URL (e.g., http://localhost:8000) [default: http://localhost:8000]
    #[arg(long)]
    pub endpoint: Option<String>,

    /// The API key for authentication (can also be set via the
    /// `PAPERLESS_API_KEY` environment variable)
    #[arg(short = 'k', long, env = "PAPERLESS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// The API version to request in the `Accept` header.
    #[arg(long, default_value_t = DEFAULT_API_VERSION)]
    pub api_version: u32,

    /// Remove each file after its successful upload.
    #[arg(long, default_value_t = false)]
    pub remove: bool,

    /// Store the `--endpoint` in the config file and exit.
    #[arg(long, default_value_t = false, requires = "endpoint")]
    pub setup: bool,

    /// Use this config file instead of the platform default.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // Parse --verbose and --quiet flags. Default to INFO log level.
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Cli {
    pub fn run(self, progress: &MultiProgress) -> anyhow::Result<()> {
        let endpoint = self.endpoint.filter(|url| !url.is_empty());

        // If --setup is provided, store the endpoint in the config file
        if self.setup {
            let config = Config { endpoint };
            config.save(self.config.as_deref())?;
            return Ok(());
        }

        let api_key = require_api_key(self.api_key)?;

        // Endpoint: CLI > config file > default
        let endpoint = endpoint
            .or_else(|| Config::load(self.config.as_deref()).endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let api = ApiConfig::new(&endpoint, api_key, self.api_version);
        debug!("Uploading to {} (API version {})", api.endpoint, api.version);

        let client = Client::new();

        for path in &self.files {
            upload_file(&client, &api, path, progress)?;

            if self.remove {
                remove_uploaded(path)?;
            }
        }

        info!("✓ Done");
        Ok(())
    }
}

/// The key from `--api-key` or `PAPERLESS_API_KEY`. Empty counts as missing.
fn require_api_key(api_key: Option<String>) -> anyhow::Result<String> {
    api_key.filter(|key| !key.is_empty()).context(
        "API key must be provided via --api-key or PAPERLESS_API_KEY.",
    )
}

/// Delete a file whose upload was confirmed.
fn remove_uploaded(path: &Path) -> anyhow::Result<()> {
    std::fs::remove_file(path)
        .with_context(|| format!("Failed to remove {}", path.display()))?;
    info!("Removed {}", path.display());
    Ok(())
}

/// Build, send, and report the upload of a single file.
fn upload_file(
    client: &Client,
    api: &ApiConfig,
    path: &Path,
    progress: &MultiProgress,
) -> anyhow::Result<()> {
    let request = UploadRequest::build(api, path)?;
    debug!(
        "{}: {} byte body, boundary {}",
        request.filename,
        request.header("Content-Length").unwrap_or("?"),
        request.boundary,
    );

    let outcome = {
        let sp = Spinner::new(progress);
        sp.set_message(format!("Uploading {}...", request.filename));
        client.send(&request)
    };

    report(&outcome);
    outcome
        .into_result()
        .with_context(|| format!("Failed to upload {}", path.display()))?;
    Ok(())
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Success { body, .. } => {
            info!("OK : {body}");
            if let Some(task_id) = outcome.task_id() {
                debug!("Consume task id: {task_id}");
            }
        }
        Outcome::HttpFailure {
            status,
            reason,
            body,
        } => {
            error!("HTTP Error {status}: {reason}");
            error!("Response: {body}");
        }
        Outcome::TransportFailure { reason } => {
            error!("URL Error: {reason}");
        }
    }
}
