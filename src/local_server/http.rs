use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use tokio::sync::oneshot;

use crate::StravaError;

pub(super) type CallbackResult<T> = Result<T, StravaError>;
pub(super) type CallbackFuture<T> = Pin<Box<dyn Future<Output = CallbackResult<T>> + Send>>;
pub(super) type CodeHandler<T> = Arc<dyn Fn(String) -> CallbackFuture<T> + Send + Sync>;
type ResultSender<T> = oneshot::Sender<CallbackResult<T>>;
pub(super) type SharedResultSender<T> = Arc<Mutex<Option<ResultSender<T>>>>;

pub(super) struct LocalServerState<T> {
    pub(super) success_html: String,
    pub(super) error_html: String,
    pub(super) on_code: CodeHandler<T>,
    pub(super) result_tx: SharedResultSender<T>,
}

impl<T> Clone for LocalServerState<T> {
    fn clone(&self) -> Self {
        Self {
            success_html: self.success_html.clone(),
            error_html: self.error_html.clone(),
            on_code: Arc::clone(&self.on_code),
            result_tx: Arc::clone(&self.result_tx),
        }
    }
}

pub(super) fn take_sender<T>(result_tx: &SharedResultSender<T>) -> Option<ResultSender<T>> {
    result_tx.lock().ok().and_then(|mut guard| guard.take())
}

pub(super) fn send_result<T>(result_tx: &SharedResultSender<T>, result: CallbackResult<T>) {
    if let Some(sender) = take_sender(result_tx) {
        let _ = sender.send(result);
    }
}

/// Pulls the `code` parameter out of a raw query string.
pub(super) fn authorization_code(query: Option<&str>) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
}

pub(super) async fn callback_handler<T: Send + 'static>(
    State(state): State<LocalServerState<T>>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let LocalServerState {
        success_html,
        error_html,
        on_code,
        result_tx,
    } = state;

    // The slot is claimed before any awaiting so a second request cannot race in.
    let Some(sender) = take_sender(&result_tx) else {
        return (StatusCode::GONE, Html(error_html));
    };

    let result = match authorization_code(query.as_deref()) {
        Some(code) => {
            tracing::info!("authorization code received");
            on_code(code).await
        }
        None => {
            tracing::warn!("callback request carried no authorization code");
            Err(StravaError::MissingAuthorizationCode)
        }
    };

    let page = match &result {
        Ok(_) => (StatusCode::OK, Html(success_html)),
        Err(_) => (StatusCode::BAD_REQUEST, Html(error_html)),
    };
    let _ = sender.send(result);
    page
}

pub(super) async fn fallback_handler<T>(
    State(state): State<LocalServerState<T>>,
) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(state.error_html))
}
