use std::future;
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use strava_gear::{
    Authorizer, Credentials, LocalServer, LocalServerConfig, READ_SCOPES, StravaConfig,
    StravaError,
};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> Credentials {
    Credentials {
        client_id: "12345".to_string(),
        client_secret: SecretString::new("client-secret".into()),
    }
}

/// Binds an ephemeral port and an authorizer whose redirect points at it.
fn authorizer_on_free_port(token_server: &MockServer) -> (Authorizer, TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let config = StravaConfig::default()
        .with_oauth_base(token_server.uri())
        .with_local_server(LocalServerConfig::new("127.0.0.1", port, "/callback"));
    let authorizer = Authorizer::new(&config, credentials()).unwrap();
    (authorizer, listener, port)
}

fn browser_visit(port: u16, target: &str) -> tokio::task::JoinHandle<u16> {
    let url = format!("http://127.0.0.1:{port}{target}");
    tokio::spawn(async move { reqwest::get(url).await.unwrap().status().as_u16() })
}

async fn mount_token(server: &MockServer, status: u16, body: serde_json::Value, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_partial_json(json!({
            "client_id": "12345",
            "client_secret": "client-secret",
            "code": "abc123",
            "grant_type": "authorization_code"
        })))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn callback_code_is_exchanged_for_token() {
    let token_server = MockServer::start().await;
    mount_token(
        &token_server,
        200,
        json!({
            "token_type": "Bearer",
            "access_token": "access-xyz",
            "refresh_token": "refresh-xyz",
            "expires_at": 1_900_000_000
        }),
        1,
    )
    .await;

    let (authorizer, listener, port) = authorizer_on_free_port(&token_server);
    let mut shown_url = String::new();
    let browser = browser_visit(port, "/callback?state=&code=abc123&scope=read,activity:read_all");

    let token = authorizer
        .authenticate_with(
            listener,
            READ_SCOPES,
            |url| {
                shown_url = url.to_string();
                Ok(())
            },
            future::pending(),
        )
        .await
        .unwrap();

    assert_eq!(token.expose_secret(), "access-xyz");
    assert_eq!(browser.await.unwrap(), 200);
    assert!(shown_url.contains("client_id=12345"));
    assert!(shown_url.contains(&format!("127.0.0.1%3A{port}%2Fcallback")));

    // The listener is gone once the flow returns.
    assert!(TcpStream::connect(("127.0.0.1", port)).is_err());
}

#[tokio::test]
async fn missing_code_fails_without_exchange() {
    let token_server = MockServer::start().await;
    mount_token(&token_server, 200, json!({ "access_token": "unused" }), 0).await;

    let (authorizer, listener, port) = authorizer_on_free_port(&token_server);
    let browser = browser_visit(port, "/callback?error=access_denied");

    let result = authorizer
        .authenticate_with(listener, READ_SCOPES, |_| Ok(()), future::pending())
        .await;

    assert!(matches!(result, Err(StravaError::MissingAuthorizationCode)));
    assert_eq!(browser.await.unwrap(), 400);
}

#[tokio::test]
async fn rejected_exchange_carries_raw_body() {
    let token_server = MockServer::start().await;
    mount_token(
        &token_server,
        400,
        json!({
            "message": "Bad Request",
            "errors": [{ "resource": "AuthorizationCode", "field": "code", "code": "invalid" }]
        }),
        1,
    )
    .await;

    let (authorizer, listener, port) = authorizer_on_free_port(&token_server);
    let browser = browser_visit(port, "/callback?code=abc123");

    let result = authorizer
        .authenticate_with(listener, READ_SCOPES, |_| Ok(()), future::pending())
        .await;

    match result {
        Err(StravaError::TokenExchangeFailed { body }) => {
            assert!(body.contains("AuthorizationCode"));
        }
        other => panic!("expected token exchange failure, got {other:?}"),
    }
    assert_eq!(browser.await.unwrap(), 400);
}

#[tokio::test]
async fn exchange_code_without_listener() {
    let token_server = MockServer::start().await;
    mount_token(&token_server, 200, json!({ "access_token": "direct" }), 1).await;

    let config = StravaConfig::default().with_oauth_base(token_server.uri());
    let authorizer = Authorizer::new(&config, credentials()).unwrap();
    let token = authorizer.exchange_code("abc123").await.unwrap();
    assert_eq!(token.expose_secret(), "direct");
}

#[tokio::test]
async fn other_paths_do_not_consume_the_callback() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = LocalServer::new(LocalServerConfig::new("127.0.0.1", port, "/callback"));

    let browser = tokio::spawn(async move {
        let favicon = reqwest::get(format!("http://127.0.0.1:{port}/favicon.ico"))
            .await
            .unwrap()
            .status()
            .as_u16();
        let callback = reqwest::get(format!("http://127.0.0.1:{port}/callback?code=c0de"))
            .await
            .unwrap()
            .status()
            .as_u16();
        (favicon, callback)
    });

    let code = server
        .listen_once(
            listener,
            |code| async move { Ok::<_, StravaError>(code) },
            future::pending(),
        )
        .await
        .unwrap();

    assert_eq!(code, "c0de");
    assert_eq!(browser.await.unwrap(), (404, 200));
}

#[tokio::test]
async fn cancellation_releases_the_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = LocalServer::new(LocalServerConfig::new("127.0.0.1", port, "/callback"));

    let result = server
        .listen_once(
            listener,
            |code| async move { Ok::<_, StravaError>(code) },
            future::ready(()),
        )
        .await;

    assert!(matches!(result, Err(StravaError::CallbackCancelled)));
    assert!(TcpStream::connect(("127.0.0.1", port)).is_err());
}

#[tokio::test]
async fn optional_timeout_ends_the_wait() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let config = LocalServerConfig::new("127.0.0.1", port, "/callback")
        .with_timeout(Duration::from_millis(50));

    let result = LocalServer::new(config)
        .listen_once(
            listener,
            |code| async move { Ok::<_, StravaError>(code) },
            future::pending(),
        )
        .await;

    assert!(matches!(result, Err(StravaError::LocalServerTimeout { .. })));
}
