use std::time::Duration;

use crate::{LocalServerConfig, StravaError};

pub const DEFAULT_API_BASE: &str = "https://www.strava.com/api/v3";
pub const DEFAULT_OAUTH_BASE: &str = "https://www.strava.com/oauth";

/// Largest page the activity list endpoint serves.
pub const DEFAULT_PER_PAGE: u32 = 200;
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(10);

pub const READ_SCOPES: &[&str] = &["read", "read_all", "profile:read_all", "activity:read_all"];
pub const WRITE_SCOPES: &[&str] = &[
    "read",
    "read_all",
    "profile:read_all",
    "activity:read_all",
    "activity:write",
];

#[derive(Debug, Clone)]
pub struct StravaConfig {
    pub api_base: String,
    pub authorize_url: String,
    pub token_url: String,
    pub local_server: LocalServerConfig,
    pub per_page: u32,
    pub settle_delay: Duration,
    pub timeout: Option<Duration>,
}

impl Default for StravaConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            authorize_url: format!("{DEFAULT_OAUTH_BASE}/authorize"),
            token_url: format!("{DEFAULT_OAUTH_BASE}/token"),
            local_server: LocalServerConfig::default(),
            per_page: DEFAULT_PER_PAGE,
            settle_delay: DEFAULT_SETTLE_DELAY,
            timeout: None,
        }
    }
}

impl StravaConfig {
    pub fn from_env() -> Result<Self, StravaError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Applies `STRAVA_API_BASE`, `STRAVA_OAUTH_BASE`, `STRAVA_REDIRECT_URI`,
    /// `STRAVA_CALLBACK_PORT` and `STRAVA_HTTP_TIMEOUT_SECS` on top of the
    /// defaults, reading values through `get`.
    ///
    /// `STRAVA_CALLBACK_PORT` is applied after `STRAVA_REDIRECT_URI`.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, StravaError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(api_base) = get("STRAVA_API_BASE") {
            config = config.with_api_base(api_base);
        }
        if let Some(oauth_base) = get("STRAVA_OAUTH_BASE") {
            config = config.with_oauth_base(oauth_base);
        }
        if let Some(redirect_uri) = get("STRAVA_REDIRECT_URI") {
            config.local_server = LocalServerConfig::from_redirect_uri(redirect_uri.trim())?;
        }
        if let Some(port) = get("STRAVA_CALLBACK_PORT") {
            let port = port.trim().parse::<u16>().map_err(|err| {
                StravaError::InvalidRedirectUri(format!("STRAVA_CALLBACK_PORT={port}: {err}"))
            })?;
            config.local_server = config.local_server.with_port(port);
        }
        if let Some(secs) = get("STRAVA_HTTP_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|err| {
                StravaError::InvalidConfig(format!("STRAVA_HTTP_TIMEOUT_SECS={secs}: {err}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_oauth_base(mut self, oauth_base: impl Into<String>) -> Self {
        let oauth_base = oauth_base.into();
        let oauth_base = oauth_base.trim_end_matches('/');
        self.authorize_url = format!("{oauth_base}/authorize");
        self.token_url = format!("{oauth_base}/token");
        self
    }

    pub fn with_local_server(mut self, local_server: LocalServerConfig) -> Self {
        self.local_server = local_server;
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn http_client(&self) -> Result<reqwest::Client, StravaError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}
