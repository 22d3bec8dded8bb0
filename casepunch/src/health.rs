//! Reachability probe for the remote site
//!
//! Used to tell "the site is down" apart from "the credentials are wrong"
//! when a case list fetch fails, since the fetch itself cannot distinguish them.

use crate::client::PunchClient;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall reachability of the remote site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,

    /// Address that was probed
    pub url: String,

    /// HTTP status code, when a response was received
    pub status_code: Option<u16>,

    /// Time taken to perform the check in milliseconds
    pub check_duration_ms: u64,

    /// Error message if the check failed
    pub error_message: Option<String>,
}

impl HealthCheckResult {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

impl PunchClient {
    /// GET the site root and report whether it answers with a success status.
    pub async fn check_connectivity(&self) -> HealthCheckResult {
        let url = self.config().site_root();
        let started = Instant::now();

        let response = self.http().get(&url).timeout(PROBE_TIMEOUT).send().await;
        let check_duration_ms = started.elapsed().as_millis() as u64;
        debug!("Connectivity probe of {} took {}ms", url, check_duration_ms);

        match response {
            Ok(response) if response.status().is_success() => HealthCheckResult {
                status: HealthStatus::Healthy,
                url,
                status_code: Some(response.status().as_u16()),
                check_duration_ms,
                error_message: None,
            },
            Ok(response) => HealthCheckResult {
                status: HealthStatus::Unhealthy,
                url,
                status_code: Some(response.status().as_u16()),
                check_duration_ms,
                error_message: Some(format!("unexpected status {}", response.status())),
            },
            Err(e) => HealthCheckResult {
                status: HealthStatus::Unhealthy,
                url,
                status_code: None,
                check_duration_ms,
                error_message: Some(e.to_string()),
            },
        }
    }
}
