//! Local redirect target for the OAuth browser flow.
//!
//! The identity provider redirects the browser to
//! `http://localhost:<port>/auth/callback?code=...` (or `?error=...`); the first
//! hit is forwarded through a oneshot channel and the server stops when the
//! `CallbackServer` is dropped.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::Query, response::Html, routing::get, Router};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::debug;

pub const CALLBACK_PATH: &str = "/auth/callback";

#[derive(Debug, Error, PartialEq)]
pub enum CallbackError {
    #[error("failed to bind callback server on port {port}: {message}")]
    Bind { port: u16, message: String },

    #[error("sign-in timed out after {0} seconds")]
    Timeout(u64),

    #[error("callback server stopped before a response arrived")]
    Closed,

    #[error("{0}")]
    Denied(String),

    #[error("callback did not contain an authorization code")]
    MissingCode,
}

#[derive(Debug, Default, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

type CallbackSender = Arc<Mutex<Option<oneshot::Sender<Result<String, CallbackError>>>>>;

const DONE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Career Coach</title></head>
<body style="font-family: system-ui; text-align: center; padding-top: 80px;">
<h2>You can close this tab and return to the terminal.</h2>
</body>
</html>"#;

fn build_callback_router(tx: CallbackSender) -> Router {
    Router::new()
        .route(
            CALLBACK_PATH,
            get(move |Query(params): Query<CallbackParams>| {
                let tx = Arc::clone(&tx);
                async move {
                    let outcome = match (params.code, params.error) {
                        (Some(code), _) if !code.is_empty() => Ok(code),
                        (_, Some(error)) => Err(CallbackError::Denied(
                            params.error_description.unwrap_or(error),
                        )),
                        _ => Err(CallbackError::MissingCode),
                    };
                    if let Some(sender) = tx.lock().await.take() {
                        let _ = sender.send(outcome);
                    }
                    Html(DONE_PAGE)
                }
            }),
        )
        .layer(TraceLayer::new_for_http())
}

pub struct CallbackServer {
    pub redirect_uri: String,
    rx: oneshot::Receiver<Result<String, CallbackError>>,
    handle: JoinHandle<()>,
}

impl CallbackServer {
    /// Binds `127.0.0.1:<port>`; port 0 picks a free one.
    pub async fn start(port: u16) -> Result<Self, CallbackError> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|e| CallbackError::Bind {
                port,
                message: e.to_string(),
            })?;
        let bound = listener
            .local_addr()
            .map_err(|e| CallbackError::Bind {
                port,
                message: e.to_string(),
            })?
            .port();

        let (tx, rx) = oneshot::channel();
        let app = build_callback_router(Arc::new(Mutex::new(Some(tx))));
        debug!(port = bound, "OAuth callback server starting");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            redirect_uri: format!("http://localhost:{bound}{CALLBACK_PATH}"),
            rx,
            handle,
        })
    }

    /// Waits for the provider redirect and returns the authorization code.
    pub async fn wait(mut self, timeout: Duration) -> Result<String, CallbackError> {
        match tokio::time::timeout(timeout, &mut self.rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(CallbackError::Closed),
            Err(_) => Err(CallbackError::Timeout(timeout.as_secs())),
        }
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
