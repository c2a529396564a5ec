//! Strava OAuth 2.0 authorization-code flow plus the two workflows built on it:
//! bulk gear assignment and weekly mileage reporting.
//!
//! Everything runs sequentially against the API; no state survives the process.

mod api;
mod auth;
pub mod bulk;
mod config;
mod credentials;
pub mod dates;
mod error;
pub mod gear;
mod interrupt;
mod local_server;
mod prompt;
mod types;
pub mod weekly;

pub use api::{ActivityQuery, StravaClient};
pub use auth::{AccessToken, Authorizer, TokenExchange};
pub use config::{
    DEFAULT_API_BASE, DEFAULT_OAUTH_BASE, DEFAULT_PER_PAGE, DEFAULT_SETTLE_DELAY, READ_SCOPES,
    StravaConfig, WRITE_SCOPES,
};
pub use credentials::{
    CLIENT_ID_ENV, CLIENT_SECRET_ENV, CredentialArgs, CredentialSource, Credentials,
};
pub use error::{Result, StravaError};
pub use interrupt::Interrupt;
pub use local_server::{DEFAULT_HOST, DEFAULT_PATH, DEFAULT_PORT, LocalServer, LocalServerConfig};
pub use prompt::{LinePrompt, Prompt, TerminalPrompt};
pub use types::{Activity, ActivityUpdate, Athlete, GearItem, METERS_TO_MILES, TokenResponse};
