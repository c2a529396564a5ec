use std::time::Duration;

use url::Url;

use crate::StravaError;

pub(crate) const DEFAULT_SUCCESS_HTML: &str = include_str!("html/success.html");
pub(crate) const DEFAULT_ERROR_HTML: &str = include_str!("html/error.html");

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PATH: &str = "/callback";

/// Where the callback listener binds and what it answers with.
///
/// There is no timeout unless one is set explicitly; an unfinished browser
/// flow keeps the listener waiting.
#[derive(Debug, Clone)]
pub struct LocalServerConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub timeout: Option<Duration>,
    pub success_html: String,
    pub error_html: String,
}

impl Default for LocalServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PATH)
    }
}

impl LocalServerConfig {
    pub fn new(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            path: normalize_path(path.into()),
            timeout: None,
            success_html: DEFAULT_SUCCESS_HTML.to_string(),
            error_html: DEFAULT_ERROR_HTML.to_string(),
        }
    }

    pub fn from_redirect_uri(redirect_uri: &str) -> Result<Self, StravaError> {
        let url = Url::parse(redirect_uri)?;
        if url.scheme() != "http" {
            return Err(StravaError::InvalidRedirectUri(
                "redirect uri must use http scheme".to_string(),
            ));
        }

        let host = url.host_str().ok_or_else(|| {
            StravaError::InvalidRedirectUri("redirect uri is missing host".to_string())
        })?;

        let port = url.port_or_known_default().ok_or_else(|| {
            StravaError::InvalidRedirectUri("redirect uri is missing port".to_string())
        })?;

        Ok(Self::new(host, port, url.path()))
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn normalize_path(path: String) -> String {
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    }
}
