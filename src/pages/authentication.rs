//! Authentication status view shown on the `/{base}/{action}` route.

#[cfg(test)]
#[path = "authentication_test.rs"]
mod authentication_test;

use leptos::prelude::*;

use crate::action::AuthAction;
use crate::state::session::SessionState;

/// User-facing text for an action given the current session.
#[must_use]
pub fn status_message(action: AuthAction, state: &SessionState) -> String {
    if let SessionState::Error(reason) = state {
        return match action {
            AuthAction::Unknown => "Unsupported authentication action.".to_owned(),
            AuthAction::LogOut | AuthAction::LogOutCallback | AuthAction::LogOutFailed => {
                format!("There was an error trying to log you out: '{reason}'")
            }
            _ => format!("There was an error trying to log you in: '{reason}'"),
        };
    }

    match (action, state) {
        (AuthAction::LogInCallback, SessionState::Authenticated(identity)) => {
            format!("Logged in as {}.", identity.display_name)
        }
        (AuthAction::LogIn, _) => "Checking login state...".to_owned(),
        (AuthAction::LogInCallback, _) => "Completing login...".to_owned(),
        (AuthAction::Register, _) => "Redirecting to registration...".to_owned(),
        (AuthAction::Profile, _) => "Redirecting to profile...".to_owned(),
        (AuthAction::LogOut, _) => "Processing logout...".to_owned(),
        (AuthAction::LogOutCallback, _) => "Processing logout callback...".to_owned(),
        (AuthAction::LogOutSucceeded, _) => "You are logged out.".to_owned(),
        (AuthAction::LogOutFailed, _) => "There was an error trying to log you out.".to_owned(),
        (AuthAction::TokenRefresh, _) => "Refreshing session...".to_owned(),
        (AuthAction::Unknown, _) => "Unsupported authentication action.".to_owned(),
    }
}

/// Progress / result panel for an authentication route.
#[component]
pub fn AuthenticationStatus(action: AuthAction, session: RwSignal<SessionState>) -> impl IntoView {
    let message = move || status_message(action, &session.get());
    let status = move || session.get().label();
    let is_error = move || matches!(session.get(), SessionState::Error(_));

    view! {
        <div class="auth-status" data-status=status>
            <p class="auth-status__message" class:error=is_error>
                {message}
            </p>
            <Show when=is_error>
                <a class="auth-status__retry" href=retry_href(action)>
                    "Try again"
                </a>
            </Show>
        </div>
    }
}

/// Relative route that retries the flow an action belongs to.
#[must_use]
pub fn retry_href(action: AuthAction) -> &'static str {
    match action {
        AuthAction::LogOut | AuthAction::LogOutCallback | AuthAction::LogOutFailed => AuthAction::LogOut.token(),
        _ => AuthAction::LogIn.token(),
    }
}
