use crate::errors::PunchError;
use chrono::{FixedOffset, Local, Utc};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://herbworklog.netlify.app/.netlify/functions";

// Applies to every request made by the client
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
// Pause between two cases of a run
const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Settings shared by the HTTP client and the run driver.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address of the remote functions, without a trailing slash
    pub base_url: String,
    /// Upper bound for a single request
    pub timeout: Duration,
    /// Delay inserted between two cases of a run
    pub request_delay: Duration,
    /// Offset of the remote system's civil calendar. `None` uses the local timezone.
    pub utc_offset_minutes: Option<i32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            request_delay: DEFAULT_REQUEST_DELAY,
            utc_offset_minutes: None,
        }
    }
}

impl ClientConfig {
    /// Build a config from `CASEPUNCH_*` environment variables, falling back
    /// to the defaults for anything unset.
    pub fn from_env() -> Result<Self, PunchError> {
        let mut config = Self::default();

        if let Ok(base_url) = env::var("CASEPUNCH_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Some(secs) = parse_var::<u64>("CASEPUNCH_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var::<u64>("CASEPUNCH_DELAY_MS")? {
            config.request_delay = Duration::from_millis(ms);
        }
        if let Some(minutes) = parse_var::<i32>("CASEPUNCH_UTC_OFFSET_MINUTES")? {
            config.utc_offset_minutes = Some(minutes);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: Option<i32>) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    pub fn validate(&self) -> Result<(), PunchError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(PunchError::Config(format!(
                "base url must be http(s), got {:?}",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(PunchError::Config("timeout must be non-zero".to_string()));
        }
        if let Some(minutes) = self.utc_offset_minutes {
            if offset_from_minutes(minutes).is_none() {
                return Err(PunchError::Config(format!(
                    "utc offset out of range: {minutes} minutes"
                )));
            }
        }
        Ok(())
    }

    /// Full address of one remote function.
    pub fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    /// Site root used for the connectivity probe: the base url with a trailing
    /// `/functions` segment removed.
    pub fn site_root(&self) -> String {
        self.base_url
            .strip_suffix("/functions")
            .unwrap_or(&self.base_url)
            .to_string()
    }

    /// Today's date (`YYYY-MM-DD`) in the remote system's civil calendar.
    pub fn today(&self) -> String {
        match self.utc_offset_minutes.and_then(offset_from_minutes) {
            Some(offset) => Utc::now().with_timezone(&offset).format("%Y-%m-%d").to_string(),
            None => Local::now().format("%Y-%m-%d").to_string(),
        }
    }
}

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, PunchError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| PunchError::Config(format!("{name}={raw:?}: {e}"))),
        Err(_) => Ok(None),
    }
}
