use std::future::Future;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use axum::{Router, routing::get};
use tokio::net::TcpListener as TokioTcpListener;
use tokio::sync::oneshot;

use crate::StravaError;

use super::config::LocalServerConfig;
use super::http::{
    CallbackFuture, CallbackResult, CodeHandler, LocalServerState, callback_handler,
    fallback_handler, send_result,
};

/// Single-use listener for the OAuth redirect.
///
/// Each call to [`LocalServer::listen_once`] serves exactly one request on the
/// callback path and shuts the listener down before returning, whatever the
/// outcome was.
#[derive(Debug, Clone)]
pub struct LocalServer {
    config: LocalServerConfig,
}

impl LocalServer {
    pub fn new(config: LocalServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocalServerConfig {
        &self.config
    }

    pub fn bind(&self) -> Result<TcpListener, StravaError> {
        TcpListener::bind((self.config.host.as_str(), self.config.port)).map_err(StravaError::from)
    }

    /// Waits for one callback, hands its `code` to `on_code` and returns that result.
    ///
    /// `cancel` resolving first tears the listener down with
    /// [`StravaError::CallbackCancelled`].
    pub async fn listen_once<T, F, Fut, C>(
        &self,
        listener: TcpListener,
        on_code: F,
        cancel: C,
    ) -> Result<T, StravaError>
    where
        T: Send + 'static,
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, StravaError>> + Send + 'static,
        C: Future<Output = ()>,
    {
        let (result_tx, result_rx) = oneshot::channel::<CallbackResult<T>>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let result_tx = Arc::new(Mutex::new(Some(result_tx)));
        let on_code: CodeHandler<T> =
            Arc::new(move |code| -> CallbackFuture<T> { Box::pin(on_code(code)) });

        let state = LocalServerState {
            success_html: self.config.success_html.clone(),
            error_html: self.config.error_html.clone(),
            on_code,
            result_tx: Arc::clone(&result_tx),
        };

        let app = Router::new()
            .route(&self.config.path, get(callback_handler::<T>))
            .fallback(fallback_handler::<T>)
            .with_state(state);

        listener.set_nonblocking(true)?;
        let listener = TokioTcpListener::from_std(listener)?;
        tracing::info!(
            "waiting for authorization callback on {}",
            self.config.redirect_uri()
        );

        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });

        let result_tx_for_server = Arc::clone(&result_tx);
        let server_handle = tokio::spawn(async move {
            if let Err(err) = server.await {
                let error = StravaError::InvalidResponse {
                    message: err.to_string(),
                    body: String::new(),
                };
                send_result(&result_tx_for_server, Err(error));
            }
        });

        let result = self.wait_for_result(result_rx, cancel).await;

        let _ = shutdown_tx.send(());
        let _ = server_handle.await;
        tracing::debug!("callback listener stopped");

        result
    }

    async fn wait_for_result<T, C>(
        &self,
        result_rx: oneshot::Receiver<CallbackResult<T>>,
        cancel: C,
    ) -> Result<T, StravaError>
    where
        C: Future<Output = ()>,
    {
        let received = async {
            match result_rx.await {
                Ok(result) => result,
                Err(_) => Err(StravaError::InvalidResponse {
                    message: "local server result channel closed".to_string(),
                    body: String::new(),
                }),
            }
        };

        let waited = async {
            match self.config.timeout {
                Some(timeout) => match tokio::time::timeout(timeout, received).await {
                    Ok(result) => result,
                    Err(_) => Err(StravaError::LocalServerTimeout { timeout }),
                },
                None => received.await,
            }
        };

        tokio::select! {
            result = waited => result,
            _ = cancel => Err(StravaError::CallbackCancelled),
        }
    }
}
