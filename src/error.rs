//! Error taxonomy for the authentication flow.
//!
//! ERROR HANDLING
//! ==============
//! `AuthenticatorError` is what the remote capability hands back. The
//! coordinator never propagates it: every variant is folded into an
//! `AuthFailure`, which is the user-visible reason carried by
//! `AuthOutcome::Failure` and by `SessionState::Error`.

/// Fault reported by the remote authenticator capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticatorError {
    #[error("provider communication failed: {0}")]
    Communication(String),
    #[error("provider request timed out")]
    Timeout,
    #[error("callback state does not match a pending request")]
    StateMismatch,
    #[error("provider denied the request: {0}")]
    Denied(String),
    #[error("{0} is not supported by this provider")]
    Unsupported(&'static str),
}

/// Reason an authentication attempt ended in failure.
///
/// Display strings are stable; the presentation layer shows them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("unsupported action")]
    UnsupportedAction,
    /// Network, timeout or provider-side error. The detail is logged, not shown.
    #[error("provider communication error")]
    ProviderCommunication(String),
    #[error("state mismatch")]
    StateMismatch,
    /// Provider refused the operation, e.g. consent denied.
    #[error("{0}")]
    Rejected(String),
    #[error("logout failed")]
    LogOutFailed,
    #[error("provider returned no identity")]
    MissingIdentity,
    #[error("unexpected redirect while completing {0}")]
    UnexpectedRedirect(&'static str),
    #[error("{0} is not supported")]
    NotSupported(&'static str),
}

impl From<AuthenticatorError> for AuthFailure {
    fn from(err: AuthenticatorError) -> Self {
        match err {
            AuthenticatorError::Communication(detail) => Self::ProviderCommunication(detail),
            AuthenticatorError::Timeout => Self::ProviderCommunication("timeout".to_owned()),
            AuthenticatorError::StateMismatch => Self::StateMismatch,
            AuthenticatorError::Denied(reason) => Self::Rejected(reason),
            AuthenticatorError::Unsupported(operation) => Self::NotSupported(operation),
        }
    }
}

/// Configuration could not be parsed or is inconsistent.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid auth config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid origin '{origin}': {source}")]
    Origin {
        origin: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid auth config: {0}")]
    Invalid(String),
}
