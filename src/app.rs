//! Application-lifetime wiring of the authentication flow.
//!
//! DESIGN
//! ======
//! `AuthApp` is created once at startup and owns the session publisher, the
//! coordinator that writes it, the redirect policy and both external
//! capabilities. Route handling is the whole data flow in one call:
//! resolve, build intent, execute, decide, navigate.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use leptos::logging::log;
use time::OffsetDateTime;

use crate::action::{AuthAction, AuthIntent, resolve};
use crate::config::AuthConfig;
use crate::error::ConfigError;
use crate::flow::{AuthOutcome, FlowCoordinator, Navigation, RedirectPolicy};
use crate::net::authenticator::RemoteAuthenticator;
use crate::net::navigation::{Navigator, current_location};
use crate::state::session::{SessionPublisher, SessionState};

pub struct AuthApp<A, N> {
    config: AuthConfig,
    coordinator: FlowCoordinator,
    policy: RedirectPolicy,
    authenticator: A,
    navigator: N,
}

impl<A, N> AuthApp<A, N>
where
    A: RemoteAuthenticator,
    N: Navigator,
{
    /// In the browser this also routes panics to the console, since they
    /// abort the application there.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: AuthConfig, authenticator: A, navigator: N) -> Result<Self, ConfigError> {
        #[cfg(feature = "hydrate")]
        console_error_panic_hook::set_once();
        config.validate()?;
        let policy = RedirectPolicy::from_config(&config)?;
        let coordinator = FlowCoordinator::new(SessionPublisher::default(), &config);
        Ok(Self { config, coordinator, policy, authenticator, navigator })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Session for readers and subscribers. Only the coordinator writes it.
    #[must_use]
    pub fn session(&self) -> &SessionPublisher {
        self.coordinator.session()
    }

    #[must_use]
    pub fn coordinator(&self) -> &FlowCoordinator {
        &self.coordinator
    }

    /// Restore whatever session the provider client already holds.
    pub async fn start(&self) -> SessionState {
        self.coordinator.restore_session(&self.authenticator).await
    }

    /// Run the action named by the trailing route `segment` for the page at
    /// `current_url`, and navigate if the outcome calls for it.
    pub async fn handle_route(&self, segment: Option<&str>, current_url: &str) -> AuthOutcome {
        let action = resolve(segment);
        let intent = AuthIntent::from_location(action, &self.config, current_url);
        self.run(intent).await
    }

    /// [`AuthApp::handle_route`] for the page the browser is on. Outside a
    /// browser the action's own route stands in for the location.
    pub async fn handle_current_route(&self, segment: Option<&str>) -> AuthOutcome {
        let location = current_location().unwrap_or_else(|| self.config.action_path(resolve(segment)));
        self.handle_route(segment, &location).await
    }

    /// Refresh tokens when the current identity is close to expiry.
    /// Returns `None` when no refresh was due.
    pub async fn refresh_if_due(&self, now: OffsetDateTime) -> Option<AuthOutcome> {
        if !self.coordinator.needs_refresh(now) {
            return None;
        }
        Some(self.run(AuthIntent::new(AuthAction::TokenRefresh, &self.config)).await)
    }

    async fn run(&self, intent: AuthIntent) -> AuthOutcome {
        let action = intent.action;
        let outcome = self.coordinator.execute(intent, &self.authenticator).await;
        if let Navigation::NavigateTo(path) = self.policy.decide(&outcome, action) {
            log!("auth: {} finished, navigating to {path}", action.token());
            self.navigator.navigate_to(&path);
        }
        outcome
    }
}
