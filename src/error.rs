use std::time::Duration;

use inquire::InquireError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StravaError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid redirect uri: {0}")]
    InvalidRedirectUri(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("invalid response: {message}")]
    InvalidResponse { message: String, body: String },

    #[error("authorization code not found in callback")]
    MissingAuthorizationCode,

    #[error("failed to retrieve access token: {body}")]
    TokenExchangeFailed { body: String },

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("interrupted")]
    Interrupted,

    #[error("authorization callback was cancelled")]
    CallbackCancelled,

    #[error("local server timed out after {timeout:?}")]
    LocalServerTimeout { timeout: Duration },

    #[error("no running shoes available for selection")]
    NoGearAvailable,

    #[error("invalid date format: {0}. Please use YYYY/MM/DD")]
    InvalidDateFormat(String),

    #[error("start date {start} must be before or equal to end date {end}")]
    DateRangeInverted { start: String, end: String },

    #[error("failed to update activity {name} (ID: {activity_id}): {payload}")]
    PerItemUpdateFailure {
        activity_id: u64,
        name: String,
        payload: String,
    },
}

pub type Result<T> = std::result::Result<T, StravaError>;

impl StravaError {
    /// Whether this error is recovered per activity rather than ending the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::PerItemUpdateFailure { .. })
    }
}

impl From<InquireError> for StravaError {
    fn from(err: InquireError) -> Self {
        match err {
            InquireError::OperationCanceled | InquireError::OperationInterrupted => {
                Self::Interrupted
            }
            InquireError::IO(err) => Self::Io(err),
            other => Self::Prompt(other.to_string()),
        }
    }
}
