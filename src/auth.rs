use std::future::Future;
use std::net::TcpListener;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;

use crate::{Credentials, LocalServer, StravaConfig, StravaError, TokenResponse};

/// Bearer token valid for the lifetime of the process.
pub type AccessToken = SecretString;

/// Server-to-server half of the authorization-code flow.
#[derive(Debug, Clone)]
pub struct TokenExchange {
    http: Client,
    token_url: String,
    credentials: Credentials,
}

impl TokenExchange {
    pub fn new(http: Client, token_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            credentials,
        }
    }

    /// Trades an authorization code for an access token.
    ///
    /// Any response without an `access_token` becomes
    /// [`StravaError::TokenExchangeFailed`] carrying the raw body.
    pub async fn exchange(&self, code: &str) -> Result<AccessToken, StravaError> {
        let payload = json!({
            "client_id": self.credentials.client_id,
            "client_secret": self.credentials.client_secret.expose_secret(),
            "code": code,
            "grant_type": "authorization_code",
        });

        let response = self.http.post(&self.token_url).json(&payload).send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = status.as_u16(), "token exchange responded");

        match serde_json::from_str::<TokenResponse>(&body) {
            Ok(token) if !token.access_token.is_empty() => {
                tracing::debug!(expires_at = ?token.expires_at, "access token received");
                Ok(SecretString::new(token.access_token.into()))
            }
            _ => Err(StravaError::TokenExchangeFailed { body }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Authorizer {
    authorize_url: String,
    server: LocalServer,
    exchange: TokenExchange,
}

impl Authorizer {
    pub fn new(config: &StravaConfig, credentials: Credentials) -> Result<Self, StravaError> {
        let http = config.http_client()?;
        Ok(Self::with_http_client(config, credentials, http))
    }

    pub fn with_http_client(config: &StravaConfig, credentials: Credentials, http: Client) -> Self {
        Self {
            authorize_url: config.authorize_url.clone(),
            server: LocalServer::new(config.local_server.clone()),
            exchange: TokenExchange::new(http, config.token_url.clone(), credentials),
        }
    }

    pub fn redirect_uri(&self) -> String {
        self.server.config().redirect_uri()
    }

    /// Builds the URL the user opens to grant `scopes`.
    pub fn authorization_url(&self, scopes: &[&str]) -> Result<String, StravaError> {
        let mut url = Url::parse(&self.authorize_url)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.exchange.credentials.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.redirect_uri())
            .append_pair("approval_prompt", "auto")
            .append_pair("scope", &scopes.join(","));
        Ok(url.to_string())
    }

    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken, StravaError> {
        self.exchange.exchange(code).await
    }

    /// Runs the whole browser flow on the configured callback port.
    ///
    /// `on_authorize` receives the authorization URL once the listener is
    /// bound. Without a timeout or a resolving `cancel`, this waits for as
    /// long as the user takes.
    pub async fn authenticate<F, C>(
        &self,
        scopes: &[&str],
        on_authorize: F,
        cancel: C,
    ) -> Result<AccessToken, StravaError>
    where
        F: FnOnce(&str) -> Result<(), StravaError>,
        C: Future<Output = ()>,
    {
        let listener = self.server.bind()?;
        self.authenticate_with(listener, scopes, on_authorize, cancel)
            .await
    }

    /// Same as [`Authorizer::authenticate`] on a listener the caller bound.
    pub async fn authenticate_with<F, C>(
        &self,
        listener: TcpListener,
        scopes: &[&str],
        on_authorize: F,
        cancel: C,
    ) -> Result<AccessToken, StravaError>
    where
        F: FnOnce(&str) -> Result<(), StravaError>,
        C: Future<Output = ()>,
    {
        let authorization_url = self.authorization_url(scopes)?;
        on_authorize(&authorization_url)?;

        let exchange = self.exchange.clone();
        self.server
            .listen_once(
                listener,
                move |code| {
                    let exchange = exchange.clone();
                    async move { exchange.exchange(&code).await }
                },
                cancel,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::LocalServerConfig;

    fn credentials() -> Credentials {
        Credentials {
            client_id: "12345".to_string(),
            client_secret: SecretString::new("shh".into()),
        }
    }

    #[test]
    fn authorization_url_includes_required_params() {
        let authorizer = Authorizer::new(&StravaConfig::default(), credentials()).unwrap();
        let auth_url = authorizer
            .authorization_url(&["read", "activity:write"])
            .unwrap();

        let url = Url::parse(&auth_url).unwrap();
        assert_eq!(url.host_str(), Some("www.strava.com"));
        assert_eq!(url.path(), "/oauth/authorize");

        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs.get("client_id"), Some(&"12345".to_string()));
        assert_eq!(pairs.get("response_type"), Some(&"code".to_string()));
        assert_eq!(
            pairs.get("redirect_uri"),
            Some(&"http://localhost:8080/callback".to_string())
        );
        assert_eq!(pairs.get("scope"), Some(&"read,activity:write".to_string()));
        assert!(!pairs.contains_key("client_secret"));
    }

    #[test]
    fn redirect_uri_follows_local_server_config() {
        let config = StravaConfig::default()
            .with_local_server(LocalServerConfig::new("127.0.0.1", 9123, "/callback"));
        let authorizer = Authorizer::new(&config, credentials()).unwrap();
        assert_eq!(authorizer.redirect_uri(), "http://127.0.0.1:9123/callback");
    }
}
