//! Auth adapter over a third-party identity provider.
//!
//! The rest of the client only ever sees `AuthState` transitions
//! (Unauthenticated → Pending → Authenticated | Unauthenticated), published by
//! the provider through a `watch` channel. `Controller` holds an
//! `Option<Arc<dyn AuthProvider>>`; `None` means login is not configured.

pub mod callback;
pub mod pkce;
pub mod supabase;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::errors::CoachError;
use crate::models::user::{Session, User};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Pending,
    Authenticated(User),
}

impl AuthState {
    pub fn name(&self) -> &'static str {
        match self {
            AuthState::Unauthenticated => "unauthenticated",
            AuthState::Pending => "pending",
            AuthState::Authenticated(_) => "authenticated",
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn display_name(&self) -> Option<String> {
        match self {
            AuthState::Authenticated(user) => Some(user.display_name()),
            _ => None,
        }
    }

    pub fn from_session(session: Option<&Session>) -> Self {
        match session {
            Some(s) => AuthState::Authenticated(s.user.clone()),
            None => AuthState::Unauthenticated,
        }
    }
}

pub type AuthCallback = Box<dyn Fn(&AuthState) + Send + Sync>;

/// Live registration of an `on_auth_state_change` callback.
/// Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// The identity provider trait. Implement this to swap providers without
/// touching the controller.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Current session, refreshed first if it is about to expire.
    async fn get_session(&self) -> Result<Option<Session>, CoachError>;

    /// Runs the provider's OAuth sign-in for `provider` (e.g. "google").
    async fn sign_in_with_oauth(&self, provider: &str) -> Result<Session, CoachError>;

    async fn sign_out(&self) -> Result<(), CoachError>;

    /// Receiver for the provider's published auth state.
    fn watch(&self) -> watch::Receiver<AuthState>;

    /// Calls `callback` with the current state right away, then after every
    /// change until the returned `Subscription` is dropped. Must be called from
    /// within a Tokio runtime.
    fn on_auth_state_change(&self, callback: AuthCallback) -> Subscription {
        let mut rx = self.watch();
        let initial = rx.borrow_and_update().clone();
        callback(&initial);

        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                callback(&state);
            }
        });
        Subscription { handle }
    }
}
