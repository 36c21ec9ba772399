//! Route action resolution.
//!
//! SYSTEM CONTEXT
//! ==============
//! The authentication page is mounted at `/{base}/{action}`. The trailing
//! segment picks one of a closed set of actions; anything else becomes
//! [`AuthAction::Unknown`], which the coordinator turns into an inline
//! "unsupported action" failure instead of breaking the page load.

#[cfg(test)]
#[path = "action_test.rs"]
mod action_test;

use url::Url;

use crate::config::AuthConfig;

/// Authentication action named by the route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthAction {
    LogIn,
    LogInCallback,
    LogOut,
    LogOutCallback,
    LogOutSucceeded,
    LogOutFailed,
    Register,
    Profile,
    TokenRefresh,
    Unknown,
}

impl AuthAction {
    /// Every recognized action, in route-table order.
    pub const RECOGNIZED: [Self; 9] = [
        Self::LogIn,
        Self::LogInCallback,
        Self::LogOut,
        Self::LogOutCallback,
        Self::LogOutSucceeded,
        Self::LogOutFailed,
        Self::Register,
        Self::Profile,
        Self::TokenRefresh,
    ];

    /// Route token for this action.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::LogIn => "LogIn",
            Self::LogInCallback => "LogInCallback",
            Self::LogOut => "LogOut",
            Self::LogOutCallback => "LogOutCallback",
            Self::LogOutSucceeded => "LogOutSucceeded",
            Self::LogOutFailed => "LogOutFailed",
            Self::Register => "Register",
            Self::Profile => "Profile",
            Self::TokenRefresh => "TokenRefresh",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether this action sends the browser to the provider and expects it
    /// to come back on a callback route.
    #[must_use]
    pub fn expects_round_trip(self) -> bool {
        matches!(self, Self::LogIn | Self::Register | Self::Profile | Self::LogOut)
    }
}

/// Map a trailing route segment to an action.
///
/// Matching is exact and case-sensitive. Missing, empty and unrecognized
/// segments all yield [`AuthAction::Unknown`].
#[must_use]
pub fn resolve(segment: Option<&str>) -> AuthAction {
    let Some(segment) = segment else {
        return AuthAction::Unknown;
    };
    AuthAction::RECOGNIZED
        .into_iter()
        .find(|action| action.token() == segment)
        .unwrap_or(AuthAction::Unknown)
}

/// An action paired with what is needed to execute it. Consumed once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthIntent {
    pub action: AuthAction,
    /// Local route the provider should send the browser back to.
    pub callback_path: Option<String>,
    pub round_trip: bool,
    /// Requested post-completion destination, unvalidated.
    pub return_url: Option<String>,
    /// Provider-supplied message, used by `LogOutFailed`.
    pub message: Option<String>,
    /// Full URL of the page handling the action. Completions pass it to the
    /// provider so it can read its own response parameters.
    pub location: String,
}

impl AuthIntent {
    /// Build an intent without reading any query parameters.
    #[must_use]
    pub fn new(action: AuthAction, config: &AuthConfig) -> Self {
        let callback_path = match action {
            AuthAction::LogIn | AuthAction::Register | AuthAction::Profile => {
                Some(config.action_path(AuthAction::LogInCallback))
            }
            AuthAction::LogOut => Some(config.action_path(AuthAction::LogOutCallback)),
            _ => None,
        };
        Self {
            action,
            callback_path,
            round_trip: action.expects_round_trip(),
            return_url: None,
            message: None,
            location: config.action_path(action),
        }
    }

    /// Build an intent for the page at `current_url`, picking up the
    /// `returnUrl` and `message` query parameters when present.
    ///
    /// `current_url` may be absolute or a local path; an unparseable value
    /// simply contributes no parameters.
    #[must_use]
    pub fn from_location(action: AuthAction, config: &AuthConfig, current_url: &str) -> Self {
        let mut intent = Self::new(action, config);
        intent.location = current_url.to_owned();
        if let Some(url) = parse_location(current_url) {
            for (key, value) in url.query_pairs() {
                match key.as_ref() {
                    "returnUrl" if !value.is_empty() => intent.return_url = Some(value.into_owned()),
                    "message" if !value.is_empty() => intent.message = Some(value.into_owned()),
                    _ => {}
                }
            }
        }
        intent
    }

    #[must_use]
    pub fn with_return_url(mut self, return_url: impl Into<String>) -> Self {
        self.return_url = Some(return_url.into());
        self
    }
}

fn parse_location(current_url: &str) -> Option<Url> {
    match Url::parse(current_url) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse("http://localhost/").ok()?;
            base.join(current_url).ok()
        }
        Err(_) => None,
    }
}
