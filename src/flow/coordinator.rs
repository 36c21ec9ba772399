//! Flow coordinator: drives one authentication action to an outcome.
//!
//! DESIGN
//! ======
//! Each route action is one step of a multi-page flow. Nothing survives a
//! page reload in here except what the provider client persists itself, so
//! the coordinator is a plain dispatch over `AuthAction` plus a small phase
//! value for progress display.
//!
//! SESSION WRITES
//! ==============
//! The coordinator is the only writer of the session publisher. It writes
//! once when an attempt reaches `Success` or `Failure`, never while
//! redirecting or completing, and never for `OperationCompleted`. A success
//! carrying a correlation id that was already applied is downgraded to
//! `OperationCompleted` so a duplicate completion cannot publish twice. An
//! id is only recorded once its success has been published; a failed attempt
//! leaves it free for a retry.
//!
//! A failed token refresh leaves an `Authenticated` session alone. The
//! provider still holds the old tokens and the next refresh retries.
//!
//! ERROR HANDLING
//! ==============
//! Provider faults are logged with their detail and folded into
//! `AuthOutcome::Failure`; nothing propagates to the hosting page.

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod coordinator_test;

use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};

use leptos::logging::{log, warn};
use time::OffsetDateTime;

use super::outcome::{AuthOutcome, FlowPhase};
use crate::action::{AuthAction, AuthIntent};
use crate::config::AuthConfig;
use crate::error::{AuthFailure, AuthenticatorError};
use crate::net::authenticator::{
    Identity, Interaction, RemoteAuthenticator, RemoteStatus, RemoteSuccess, SignInRequest, SignOutRequest,
};
use crate::state::session::{SessionPublisher, SessionState};

/// What a settled provider call means for the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Settlement {
    SignIn,
    SignOut,
    Refresh,
}

impl Settlement {
    fn describe(self) -> &'static str {
        match self {
            Self::SignIn => "login",
            Self::SignOut => "logout",
            Self::Refresh => "token refresh",
        }
    }
}

/// Correlation ids remembered for duplicate detection.
const COMPLETED_CAPACITY: usize = 64;

/// Recently applied correlation ids, oldest evicted first.
#[derive(Debug, Default)]
struct CompletionLedger {
    order: VecDeque<String>,
    ids: HashSet<String>,
}

impl CompletionLedger {
    fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    fn record(&mut self, id: &str) {
        if !self.ids.insert(id.to_owned()) {
            return;
        }
        self.order.push_back(id.to_owned());
        if self.order.len() > COMPLETED_CAPACITY {
            if let Some(evicted) = self.order.pop_front() {
                self.ids.remove(&evicted);
            }
        }
    }
}

pub struct FlowCoordinator {
    session: SessionPublisher,
    completed: RefCell<CompletionLedger>,
    phase: Cell<FlowPhase>,
    refresh_leeway: time::Duration,
}

impl FlowCoordinator {
    #[must_use]
    pub fn new(session: SessionPublisher, config: &AuthConfig) -> Self {
        let leeway_secs = i64::try_from(config.refresh_leeway_secs).unwrap_or(i64::MAX);
        Self {
            session,
            completed: RefCell::new(CompletionLedger::default()),
            phase: Cell::new(FlowPhase::Idle),
            refresh_leeway: time::Duration::seconds(leeway_secs),
        }
    }

    /// Read access to the session this coordinator writes.
    #[must_use]
    pub fn session(&self) -> &SessionPublisher {
        &self.session
    }

    #[must_use]
    pub fn phase(&self) -> FlowPhase {
        self.phase.get()
    }

    /// Whether the signed-in identity expires within the refresh leeway.
    #[must_use]
    pub fn needs_refresh(&self, now: OffsetDateTime) -> bool {
        self.session
            .current()
            .identity()
            .is_some_and(|identity| identity.expires_within(self.refresh_leeway, now))
    }

    /// Execute an intent against the remote authenticator.
    ///
    /// Returns `InProgress` only when the provider has started navigating
    /// away; every other path ends in `Success`, `Failure` or
    /// `OperationCompleted`.
    pub async fn execute<A>(&self, intent: AuthIntent, authenticator: &A) -> AuthOutcome
    where
        A: RemoteAuthenticator + ?Sized,
    {
        log!("auth: executing {}", intent.action.token());
        let outcome = match intent.action {
            AuthAction::LogIn | AuthAction::Register | AuthAction::Profile => {
                self.phase.set(FlowPhase::Redirecting);
                let request = SignInRequest {
                    interaction: interaction_for(intent.action),
                    callback_path: intent.callback_path.clone(),
                    return_url: intent.return_url.clone(),
                };
                let result = authenticator.begin_login(&request).await;
                self.settle(Settlement::SignIn, result, true, authenticator).await
            }
            AuthAction::LogOut => {
                self.phase.set(FlowPhase::Redirecting);
                let request = SignOutRequest {
                    callback_path: intent.callback_path.clone(),
                    return_url: intent.return_url.clone(),
                };
                let result = authenticator.begin_logout(&request).await;
                self.settle(Settlement::SignOut, result, true, authenticator).await
            }
            AuthAction::LogInCallback => {
                self.phase.set(FlowPhase::Completing);
                let result = authenticator.complete_login(&intent.location).await;
                self.settle(Settlement::SignIn, result, false, authenticator).await
            }
            AuthAction::LogOutCallback => {
                self.phase.set(FlowPhase::Completing);
                let result = authenticator.complete_logout(&intent.location).await;
                self.settle(Settlement::SignOut, result, false, authenticator).await
            }
            AuthAction::TokenRefresh => {
                self.phase.set(FlowPhase::Completing);
                let result = authenticator.refresh().await;
                self.settle(Settlement::Refresh, result, false, authenticator).await
            }
            AuthAction::LogOutSucceeded => {
                self.session.publish(SessionState::Anonymous);
                AuthOutcome::Success(None)
            }
            AuthAction::LogOutFailed => {
                let reason = intent.message.map_or(AuthFailure::LogOutFailed, AuthFailure::Rejected);
                self.fail(reason)
            }
            AuthAction::Unknown => self.fail(AuthFailure::UnsupportedAction),
        };
        self.phase.set(FlowPhase::from(&outcome));
        outcome
    }

    /// Load any session the provider client already holds. Run once at startup.
    pub async fn restore_session<A>(&self, authenticator: &A) -> SessionState
    where
        A: RemoteAuthenticator + ?Sized,
    {
        self.session.publish(SessionState::Authenticating);
        let next = match authenticator.current_identity().await {
            Ok(Some(identity)) => SessionState::Authenticated(identity),
            Ok(None) => SessionState::Anonymous,
            Err(e) => {
                warn!("auth: session restore failed: {e}");
                SessionState::Error(AuthFailure::from(e).to_string())
            }
        };
        self.session.publish(next.clone());
        next
    }

    async fn settle<A>(
        &self,
        kind: Settlement,
        result: Result<RemoteStatus, AuthenticatorError>,
        beginning: bool,
        authenticator: &A,
    ) -> AuthOutcome
    where
        A: RemoteAuthenticator + ?Sized,
    {
        match result {
            Ok(RemoteStatus::Redirect) if beginning => AuthOutcome::InProgress,
            Ok(RemoteStatus::Redirect) => self.fail_attempt(kind, AuthFailure::UnexpectedRedirect(kind.describe())),
            Ok(RemoteStatus::Success(success)) => self.succeed(kind, success, authenticator).await,
            Ok(RemoteStatus::Failure(message)) => {
                warn!("auth: {} rejected by provider: {message}", kind.describe());
                self.fail_attempt(kind, AuthFailure::Rejected(message))
            }
            Ok(RemoteStatus::OperationCompleted) => {
                log!("auth: {} already completed", kind.describe());
                AuthOutcome::OperationCompleted
            }
            Err(AuthenticatorError::StateMismatch) => self.resolve_mismatch(kind),
            Err(e) => {
                warn!("auth: {} failed: {e}", kind.describe());
                self.fail_attempt(kind, e.into())
            }
        }
    }

    async fn succeed<A>(&self, kind: Settlement, success: RemoteSuccess, authenticator: &A) -> AuthOutcome
    where
        A: RemoteAuthenticator + ?Sized,
    {
        if let Some(id) = &success.correlation_id {
            if self.completed.borrow().contains(id) {
                log!("auth: ignoring duplicate {} completion {id}", kind.describe());
                return AuthOutcome::OperationCompleted;
            }
        }

        let next = match kind {
            Settlement::SignOut => SessionState::Anonymous,
            Settlement::SignIn | Settlement::Refresh => match self.identity_for(success.identity, authenticator).await {
                Some(identity) => SessionState::Authenticated(identity),
                None => return self.fail_attempt(kind, AuthFailure::MissingIdentity),
            },
        };
        if let Some(id) = &success.correlation_id {
            // Another completion may have settled while the identity was fetched.
            if self.completed.borrow().contains(id) {
                log!("auth: ignoring duplicate {} completion {id}", kind.describe());
                return AuthOutcome::OperationCompleted;
            }
            self.completed.borrow_mut().record(id);
        }
        self.session.publish(next);
        AuthOutcome::Success(success.return_url)
    }

    async fn identity_for<A>(&self, reported: Option<Identity>, authenticator: &A) -> Option<Identity>
    where
        A: RemoteAuthenticator + ?Sized,
    {
        if reported.is_some() {
            return reported;
        }
        match authenticator.current_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                warn!("auth: identity lookup failed: {e}");
                None
            }
        }
    }

    /// A callback whose state marker matches no pending request is harmless
    /// when the session already reflects the operation (duplicate tab, stale
    /// reload); otherwise it is a failure.
    fn resolve_mismatch(&self, kind: Settlement) -> AuthOutcome {
        let current = self.session.current();
        let already_applied = match kind {
            Settlement::SignIn | Settlement::Refresh => current.is_authenticated(),
            Settlement::SignOut => matches!(*current, SessionState::Anonymous),
        };
        if already_applied {
            log!("auth: stale {} callback, session already {}", kind.describe(), current.label());
            AuthOutcome::OperationCompleted
        } else {
            warn!("auth: {} callback state mismatch", kind.describe());
            self.fail_attempt(kind, AuthFailure::StateMismatch)
        }
    }

    fn fail_attempt(&self, kind: Settlement, reason: AuthFailure) -> AuthOutcome {
        if kind == Settlement::Refresh && self.session.current().is_authenticated() {
            warn!("auth: keeping current session after failed token refresh: {reason}");
            return AuthOutcome::Failure(reason);
        }
        self.fail(reason)
    }

    fn fail(&self, reason: AuthFailure) -> AuthOutcome {
        self.session.publish(SessionState::Error(reason.to_string()));
        AuthOutcome::Failure(reason)
    }
}

fn interaction_for(action: AuthAction) -> Interaction {
    match action {
        AuthAction::Register => Interaction::Register,
        AuthAction::Profile => Interaction::EditProfile,
        _ => Interaction::SignIn,
    }
}
