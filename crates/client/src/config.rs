use eyre::{Result, WrapErr, eyre};
use std::env;
use std::time::Duration;

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base URL of the scheduling backend, without a trailing slash
    pub base_url: String,
    /// Meeting whose schedule is loaded
    pub meeting: String,
    /// Bound on every fetch and mutation request
    pub fetch_timeout: Duration,
}

impl SourceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("AGENDA_BACKEND_URL")
            .map_err(|_| eyre!("AGENDA_BACKEND_URL environment variable not set"))?;

        let meeting = env::var("AGENDA_MEETING")
            .map_err(|_| eyre!("AGENDA_MEETING environment variable not set"))?;

        let fetch_timeout = env::var("AGENDA_FETCH_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .wrap_err("Invalid AGENDA_FETCH_TIMEOUT_SECONDS value")?;

        Ok(Self::new(base_url, meeting, Duration::from_secs(fetch_timeout)))
    }

    pub fn new(base_url: impl Into<String>, meeting: impl Into<String>, fetch_timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            meeting: meeting.into(),
            fetch_timeout,
        }
    }

    /// URL of a meeting-scoped endpoint
    pub fn meeting_url(&self, path: &str) -> String {
        format!(
            "{}/meeting/{}/{}",
            self.base_url,
            self.meeting,
            path.trim_start_matches('/')
        )
    }

    /// Resolves an href, which may already be absolute
    pub fn resolve(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else {
            format!("{}/{}", self.base_url, href.trim_start_matches('/'))
        }
    }
}
