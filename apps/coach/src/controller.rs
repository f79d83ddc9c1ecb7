//! View controller. Owns the `ViewState` and runs one action per call.
//!
//! Every action follows the same shape: claim the loading flag, validate
//! locally, issue at most one request, then write the outcome back. The state
//! lock is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::auth::{AuthProvider, AuthState, Subscription};
use crate::backend_client::BackendClient;
use crate::errors::CoachError;
use crate::messages::Messages;
use crate::models::analysis::{AnalysisRequest, AnalysisResult, HealthStatus};
use crate::state::{Action, ViewState};
use crate::upload::validation::{validate_analysis_inputs, validate_file};
use crate::upload::UploadedFile;

type SharedState = Arc<Mutex<ViewState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, ViewState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Controller {
    backend: BackendClient,
    auth: Option<Arc<dyn AuthProvider>>,
    state: SharedState,
    messages: &'static Messages,
    // Dropped with the controller, which ends the provider subscription.
    _auth_subscription: Option<Subscription>,
}

impl Controller {
    /// Must be called from within a Tokio runtime when `auth` is set.
    pub fn new(
        backend: BackendClient,
        auth: Option<Arc<dyn AuthProvider>>,
        messages: &'static Messages,
    ) -> Self {
        let state: SharedState = Arc::new(Mutex::new(ViewState::new(auth.is_some())));

        let auth_subscription = auth.as_ref().map(|provider| {
            let state = Arc::clone(&state);
            provider.on_auth_state_change(Box::new(move |auth_state: &AuthState| {
                lock(&state).auth_changed(auth_state.clone());
            }))
        });

        Self {
            backend,
            auth,
            state,
            messages,
            _auth_subscription: auth_subscription,
        }
    }

    pub fn snapshot(&self) -> ViewState {
        lock(&self.state).clone()
    }

    pub fn messages(&self) -> &'static Messages {
        self.messages
    }

    pub fn api_url(&self) -> &str {
        self.backend.base_url()
    }

    pub fn set_job_description(&self, text: impl Into<String>) {
        lock(&self.state).job_description = text.into();
    }

    pub fn set_api_key(&self, key: impl Into<String>) {
        lock(&self.state).api_key = key.into();
    }

    pub async fn check_health(&self) -> Result<HealthStatus, CoachError> {
        lock(&self.state).begin(Action::Health, self.messages)?;

        match self.backend.health().await {
            Ok(health) => {
                info!("Backend healthy: {} ({})", health.service, health.status);
                lock(&self.state).health_succeeded(health.clone());
                Ok(health)
            }
            Err(e) => {
                lock(&self.state).fail(Action::Health, e.clone());
                Err(e)
            }
        }
    }

    /// Validates `file` locally, then sends it for text extraction.
    pub async fn upload(&self, file: UploadedFile) -> Result<(), CoachError> {
        lock(&self.state).begin(Action::Upload, self.messages)?;

        if let Err(e) = validate_file(&file, self.messages) {
            warn!("Rejected '{}': {e}", file.name);
            lock(&self.state).upload_failed(e.clone());
            return Err(e);
        }

        match self.backend.upload_cv(&file).await {
            Ok(text) => {
                info!("Uploaded '{}'", file.name);
                lock(&self.state).upload_succeeded(file.name, text);
                Ok(())
            }
            Err(e) => {
                lock(&self.state).upload_failed(e.clone());
                Err(e)
            }
        }
    }

    pub async fn analyze(&self) -> Result<AnalysisResult, CoachError> {
        let request = {
            let mut state = lock(&self.state);
            state.begin(Action::Analyze, self.messages)?;
            if let Err(e) = validate_analysis_inputs(
                &state.cv_text,
                &state.job_description,
                &state.api_key,
                self.messages,
            ) {
                state.fail(Action::Analyze, e.clone());
                return Err(e);
            }
            AnalysisRequest {
                cv_text: state.cv_text.clone(),
                job_description: state.job_description.clone(),
                api_key: state.api_key.clone(),
            }
        };

        match self.backend.analyze(&request).await {
            Ok(result) => {
                info!("Analysis complete: {}% match", result.match_percentage);
                lock(&self.state).analysis_succeeded(result.clone());
                Ok(result)
            }
            Err(e) => {
                lock(&self.state).fail(Action::Analyze, e.clone());
                Err(e)
            }
        }
    }

    /// Picks up an existing provider session, if any. No-op without auth.
    pub async fn restore_session(&self) -> Result<(), CoachError> {
        let Some(auth) = &self.auth else {
            return Ok(());
        };
        match auth.get_session().await {
            Ok(session) => {
                lock(&self.state).auth_changed(AuthState::from_session(session.as_ref()));
                Ok(())
            }
            Err(e) => {
                lock(&self.state).report(Action::Login, e.clone());
                Err(e)
            }
        }
    }

    pub async fn login(&self, provider: &str) -> Result<(), CoachError> {
        let auth = self.require_auth(Action::Login)?;
        match auth.sign_in_with_oauth(provider).await {
            Ok(session) => {
                lock(&self.state).auth_changed(AuthState::Authenticated(session.user));
                Ok(())
            }
            Err(e) => {
                lock(&self.state).report(Action::Login, e.clone());
                Err(e)
            }
        }
    }

    pub async fn logout(&self) -> Result<(), CoachError> {
        let auth = self.require_auth(Action::Logout)?;
        let outcome = auth.sign_out().await;

        let mut state = lock(&self.state);
        state.auth_changed(AuthState::Unauthenticated);
        if let Err(e) = &outcome {
            state.report(Action::Logout, e.clone());
        }
        outcome
    }

    fn require_auth(&self, action: Action) -> Result<Arc<dyn AuthProvider>, CoachError> {
        match &self.auth {
            Some(auth) => Ok(Arc::clone(auth)),
            None => {
                let e = CoachError::Auth(self.messages.auth_unavailable.to_string());
                lock(&self.state).report(action, e.clone());
                Err(e)
            }
        }
    }
}
