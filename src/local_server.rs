mod config;
mod http;
mod server;

pub use config::{DEFAULT_HOST, DEFAULT_PATH, DEFAULT_PORT, LocalServerConfig};
pub use server::LocalServer;
