//! Single bounded-timeout reachability check

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::registry::ServiceDescriptor;

/// Outcome of one probe attempt
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub service: ServiceDescriptor,
    pub reachable: bool,
    pub status_code: Option<u16>,
    pub error: Option<String>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ProbeResult {
    /// Short human-readable description of the outcome
    pub fn describe(&self) -> String {
        match (self.reachable, self.status_code, &self.error) {
            (true, _, _) => "healthy (HTTP 200)".to_string(),
            (false, Some(code), _) => format!("unhealthy (HTTP {})", code),
            (false, None, Some(error)) => format!("unreachable: {}", error),
            (false, None, None) => "unreachable".to_string(),
        }
    }
}

/// Issues health probes with a fixed per-request timeout
#[derive(Debug, Clone)]
pub struct HealthProber {
    client: reqwest::Client,
    timeout: Duration,
}

impl HealthProber {
    /// Creates a prober with its own HTTP client
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, timeout))
    }

    /// Creates a prober sharing an existing HTTP client
    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probes one service. Never fails: every error becomes part of the result.
    pub async fn probe(&self, descriptor: &ServiceDescriptor) -> ProbeResult {
        let url = descriptor.health_url();
        let start = Instant::now();
        let outcome = self.client.get(&url).timeout(self.timeout).send().await;
        let elapsed = start.elapsed();

        let (reachable, status_code, error) = match outcome {
            Ok(response) => {
                let status = response.status();
                (status == StatusCode::OK, Some(status.as_u16()), None)
            }
            Err(e) => {
                let reason = if e.is_timeout() {
                    format!("timed out after {:?}", self.timeout)
                } else if e.is_connect() {
                    "connection refused".to_string()
                } else {
                    e.to_string()
                };
                (false, None, Some(reason))
            }
        };

        if reachable {
            debug!(service = %descriptor.name, %url, ?elapsed, "probe succeeded");
        } else {
            warn!(service = %descriptor.name, %url, status = ?status_code, error = ?error, "probe failed");
        }

        ProbeResult {
            service: descriptor.clone(),
            reachable,
            status_code,
            error,
            elapsed,
        }
    }
}
