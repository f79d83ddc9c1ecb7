use crate::auth::AuthState;
use crate::errors::CoachError;
use crate::messages::Messages;
use crate::models::analysis::{AnalysisResult, HealthStatus};

/// User action that last touched the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Health,
    Upload,
    Analyze,
    Login,
    Logout,
}

/// The single in-memory snapshot behind the screen.
///
/// Fields are only written through the transition methods below, each called
/// by the action that started the corresponding request.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub file_name: Option<String>,
    pub cv_text: String,
    pub job_description: String,
    pub api_key: String,
    pub loading: bool,
    pub last_action: Option<Action>,
    pub error: Option<CoachError>,
    pub result: Option<AnalysisResult>,
    pub health: Option<HealthStatus>,
    /// False when no identity provider is configured; login controls stay hidden.
    pub auth_available: bool,
    pub auth: AuthState,
}

impl ViewState {
    pub fn new(auth_available: bool) -> Self {
        Self {
            auth_available,
            ..Default::default()
        }
    }

    /// Claims the loading flag for `action`. Rejected while another request is
    /// in flight; the in-flight action's state is left untouched.
    pub fn begin(&mut self, action: Action, messages: &Messages) -> Result<(), CoachError> {
        if self.loading {
            return Err(CoachError::Validation(messages.request_in_flight.to_string()));
        }
        self.loading = true;
        self.last_action = Some(action);
        self.error = None;
        Ok(())
    }

    /// Records an error without touching the loading flag.
    pub fn report(&mut self, action: Action, err: CoachError) {
        self.last_action = Some(action);
        self.result = None;
        self.health = None;
        self.error = Some(err);
    }

    /// Ends the current request with an error.
    pub fn fail(&mut self, action: Action, err: CoachError) {
        self.loading = false;
        self.report(action, err);
    }

    pub fn upload_failed(&mut self, err: CoachError) {
        self.file_name = None;
        self.cv_text.clear();
        self.fail(Action::Upload, err);
    }

    pub fn upload_succeeded(&mut self, file_name: String, cv_text: String) {
        self.loading = false;
        self.file_name = Some(file_name);
        self.cv_text = cv_text;
        self.result = None;
    }

    pub fn analysis_succeeded(&mut self, result: AnalysisResult) {
        self.loading = false;
        self.result = Some(result);
    }

    pub fn health_succeeded(&mut self, health: HealthStatus) {
        self.loading = false;
        self.health = Some(health);
    }

    pub fn auth_changed(&mut self, auth: AuthState) {
        self.auth = auth;
    }

    pub fn display_name(&self) -> Option<String> {
        self.auth.display_name()
    }
}
