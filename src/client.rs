use log::{debug, info};
use std::time::Instant;
use ureq::tls::{TlsConfig, TlsProvider};

use crate::api::{Outcome, UploadRequest};

/// Upper bound on how much of a response body we read.
const RESPONSE_LIMIT: u64 = 100 << 20; // 100 MiB

/// Blocking client for the Paperless document upload endpoint
pub struct Client {
    /// HTTP agent for making requests
    agent: ureq::Agent,
}

impl Client {
    pub fn new() -> Self {
        // Non-2xx responses come back as `Ok(response)` so we can classify
        // them ourselves instead of unpicking `ureq::Error::StatusCode`.
        let config = ureq::config::Config::builder()
            .http_status_as_error(false)
            .tls_config(
                TlsConfig::builder().provider(TlsProvider::NativeTls).build(),
            )
            .build();
        let agent = ureq::Agent::new_with_config(config);
        Self { agent }
    }

    /// POST the request once and classify what comes back.
    pub fn send(&self, request: &UploadRequest) -> Outcome {
        let start_time = Instant::now();

        let mut builder = self.agent.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let response = match builder.send(&request.body[..]) {
            Ok(response) => response,
            Err(err) => {
                debug!("upload: transport error after {:?}", start_time.elapsed());
                return Outcome::TransportFailure {
                    reason: err.to_string(),
                };
            }
        };

        let status = response.status();
        let mut body = response.into_body();
        let body = match body.with_config().limit(RESPONSE_LIMIT).read_to_vec() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            // A success we can't read is still a transport problem; an error
            // status stays an HTTP failure with whatever we managed to get.
            Err(err) if status.is_success() => {
                return Outcome::TransportFailure {
                    reason: err.to_string(),
                };
            }
            Err(err) => {
                debug!("upload: failed to read error body: {err}");
                String::new()
            }
        };

        info!(
            "upload: {} completed in {:?} with status {} ({} byte response)",
            request.filename,
            start_time.elapsed(),
            status.as_u16(),
            body.len(),
        );

        if status.is_success() {
            Outcome::Success {
                status: status.as_u16(),
                body,
            }
        } else {
            Outcome::HttpFailure {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                body,
            }
        }
    }
}

// --- Tests ---
