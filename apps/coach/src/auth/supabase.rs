use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::auth::callback::CallbackServer;
use crate::auth::pkce::generate_pkce_pair;
use crate::auth::{AuthProvider, AuthState};
use crate::config::AuthConfig;
use crate::errors::CoachError;
use crate::messages::Messages;
use crate::models::user::{Session, User};

/// Sessions this close to expiry are refreshed by `get_session`.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Opens the authorization URL for the user. Defaults to the system browser.
pub type BrowserLauncher = Arc<dyn Fn(&str) -> std::io::Result<()> + Send + Sync>;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .or_else(|| {
                self.expires_in
                    .map(|secs| Utc::now() + chrono::Duration::seconds(secs))
            });
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Supabase (GoTrue) auth over its REST API, using the authorization-code +
/// PKCE flow with a local redirect target. The session is kept in memory only.
pub struct SupabaseAuth {
    client: Client,
    url: String,
    anon_key: String,
    callback_port: u16,
    callback_timeout: Duration,
    launcher: BrowserLauncher,
    messages: &'static Messages,
    session: Mutex<Option<Session>>,
    state_tx: watch::Sender<AuthState>,
}

impl SupabaseAuth {
    pub fn new(
        config: &AuthConfig,
        timeout: Duration,
        messages: &'static Messages,
    ) -> Result<Self, CoachError> {
        let (state_tx, _) = watch::channel(AuthState::Unauthenticated);
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            callback_port: config.callback_port,
            callback_timeout: Duration::from_secs(config.callback_timeout_secs),
            launcher: Arc::new(|url: &str| open::that(url)),
            messages,
            session: Mutex::new(None),
            state_tx,
        })
    }

    pub fn with_launcher(mut self, launcher: BrowserLauncher) -> Self {
        self.launcher = launcher;
        self
    }

    fn auth_error(&self, detail: impl Display) -> CoachError {
        CoachError::Auth(format!("{}{detail}", self.messages.auth_error_prefix))
    }

    fn publish(&self, state: AuthState) {
        debug!("Auth state -> {}", state.name());
        self.state_tx.send_replace(state);
    }

    fn authorize_url(
        &self,
        provider: &str,
        redirect_to: &str,
        challenge: &str,
    ) -> Result<Url, CoachError> {
        Url::parse_with_params(
            &format!("{}/auth/v1/authorize", self.url),
            &[
                ("provider", provider),
                ("redirect_to", redirect_to),
                ("code_challenge", challenge),
                ("code_challenge_method", "s256"),
            ],
        )
        .map_err(|e| self.auth_error(e))
    }

    /// POST /auth/v1/token?grant_type=<grant_type>
    async fn token_request(&self, grant_type: &str, body: Value) -> Result<Session, CoachError> {
        let url = format!("{}/auth/v1/token", self.url);
        debug!("POST {url}?grant_type={grant_type}");

        let response = self
            .client
            .post(&url)
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.auth_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.auth_error(e))?;
        if !status.is_success() {
            warn!("Token request ({grant_type}) returned {status}: {text}");
            return Err(self.auth_error(
                provider_error_message(&text).unwrap_or_else(|| status.to_string()),
            ));
        }

        serde_json::from_str::<TokenResponse>(&text)
            .map(TokenResponse::into_session)
            .map_err(|e| self.auth_error(e))
    }

    async fn run_oauth_flow(&self, provider: &str) -> Result<Session, CoachError> {
        let pkce = generate_pkce_pair();
        let server = CallbackServer::start(self.callback_port)
            .await
            .map_err(|e| self.auth_error(e))?;
        let url = self.authorize_url(provider, &server.redirect_uri, &pkce.challenge)?;

        info!("Opening browser for {provider} sign-in");
        info!("If the browser does not open, visit: {url}");
        (self.launcher)(url.as_str()).map_err(|e| self.auth_error(e))?;

        let code = server
            .wait(self.callback_timeout)
            .await
            .map_err(|e| self.auth_error(e))?;

        self.token_request(
            "pkce",
            json!({ "auth_code": code, "code_verifier": pkce.verifier }),
        )
        .await
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn get_session(&self) -> Result<Option<Session>, CoachError> {
        let mut guard = self.session.lock().await;
        let Some(session) = guard.clone() else {
            return Ok(None);
        };
        if !session.expires_within(chrono::Duration::seconds(REFRESH_MARGIN_SECS)) {
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token.clone() else {
            info!("Session expired and cannot be refreshed");
            *guard = None;
            self.publish(AuthState::Unauthenticated);
            return Ok(None);
        };

        match self
            .token_request("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
        {
            Ok(refreshed) => {
                debug!("Session refreshed");
                *guard = Some(refreshed.clone());
                self.publish(AuthState::Authenticated(refreshed.user.clone()));
                Ok(Some(refreshed))
            }
            Err(e) => {
                *guard = None;
                self.publish(AuthState::Unauthenticated);
                Err(e)
            }
        }
    }

    async fn sign_in_with_oauth(&self, provider: &str) -> Result<Session, CoachError> {
        self.publish(AuthState::Pending);

        match self.run_oauth_flow(provider).await {
            Ok(session) => {
                info!("Signed in as {}", session.user.display_name());
                *self.session.lock().await = Some(session.clone());
                self.publish(AuthState::Authenticated(session.user.clone()));
                Ok(session)
            }
            Err(e) => {
                warn!("Sign-in failed: {e}");
                let current = self.session.lock().await;
                self.publish(AuthState::from_session((*current).as_ref()));
                Err(e)
            }
        }
    }

    async fn sign_out(&self) -> Result<(), CoachError> {
        let session = self.session.lock().await.take();
        self.publish(AuthState::Unauthenticated);

        let Some(session) = session else {
            return Ok(());
        };

        let url = format!("{}/auth/v1/logout", self.url);
        debug!("POST {url}");
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| self.auth_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("Logout returned {status}: {text}");
            return Err(self.auth_error(
                provider_error_message(&text).unwrap_or_else(|| status.to_string()),
            ));
        }

        info!("Signed out");
        Ok(())
    }

    fn watch(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }
}

/// GoTrue reports errors as `error_description`, `msg`, `message` or `error`,
/// depending on the endpoint and version.
fn provider_error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| parsed.get(key).and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty())
        .map(String::from)
}
