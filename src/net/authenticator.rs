//! Remote authenticator capability.
//!
//! SYSTEM CONTEXT
//! ==============
//! The identity provider's protocol (authorization requests, the state
//! parameter, token storage, signature checks) lives behind this trait. The
//! flow coordinator only sequences calls and interprets the results.
//!
//! Futures are `?Send`: the browser runtime is single-threaded and provider
//! clients typically hold `JsValue`s.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::AuthenticatorError;

/// Minimal identity summary for an authenticated session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub display_name: String,
    pub expires_at: Option<OffsetDateTime>,
}

impl Identity {
    #[must_use]
    pub fn new(subject: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self { subject: subject.into(), display_name: display_name.into(), expires_at: None }
    }

    #[must_use]
    pub fn expiring_at(mut self, expires_at: OffsetDateTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// True when the identity has an expiry at or before `now + leeway`.
    #[must_use]
    pub fn expires_within(&self, leeway: time::Duration, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|at| at <= now + leeway)
    }
}

/// Which provider-side user flow a sign-in should open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interaction {
    #[default]
    SignIn,
    Register,
    EditProfile,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignInRequest {
    pub interaction: Interaction,
    /// Local route the provider redirects back to.
    pub callback_path: Option<String>,
    pub return_url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignOutRequest {
    pub callback_path: Option<String>,
    pub return_url: Option<String>,
}

/// Confirmed result of a provider operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoteSuccess {
    /// Provider state parameter the result belongs to, when there was one.
    pub correlation_id: Option<String>,
    /// Signed-in identity; `None` after a sign-out.
    pub identity: Option<Identity>,
    /// Return URL the provider carried through the round trip.
    pub return_url: Option<String>,
}

/// Status of a settled provider call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteStatus {
    /// The provider has started navigating the browser away.
    Redirect,
    Success(RemoteSuccess),
    /// The provider reported a failure, with its message.
    Failure(String),
    /// Already handled elsewhere (another tab, an earlier load).
    OperationCompleted,
}

/// Operations the coordinator consumes from the identity provider client.
#[async_trait(?Send)]
pub trait RemoteAuthenticator {
    async fn begin_login(&self, request: &SignInRequest) -> Result<RemoteStatus, AuthenticatorError>;

    /// Finish a sign-in using the callback page's full URL.
    async fn complete_login(&self, callback_url: &str) -> Result<RemoteStatus, AuthenticatorError>;

    async fn begin_logout(&self, request: &SignOutRequest) -> Result<RemoteStatus, AuthenticatorError>;

    async fn complete_logout(&self, callback_url: &str) -> Result<RemoteStatus, AuthenticatorError>;

    /// Renew the current session's tokens without a visible round trip.
    async fn refresh(&self) -> Result<RemoteStatus, AuthenticatorError> {
        Err(AuthenticatorError::Unsupported("token refresh"))
    }

    /// Identity held in the provider client's own storage, if any.
    async fn current_identity(&self) -> Result<Option<Identity>, AuthenticatorError> {
        Ok(None)
    }
}
