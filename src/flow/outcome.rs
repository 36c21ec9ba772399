//! Outcome and phase types for a single authentication attempt.

use crate::error::AuthFailure;

/// Result of executing an intent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The browser is leaving for the provider; the attempt finishes on a
    /// later page load.
    InProgress,
    /// Confirmed, with an optional (unvalidated) return URL.
    Success(Option<String>),
    Failure(AuthFailure),
    /// Already finished by another tab or an earlier load. Success-equivalent.
    OperationCompleted,
}

impl AuthOutcome {
    /// `Success` or `OperationCompleted`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_) | Self::OperationCompleted)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }

    #[must_use]
    pub fn failure(&self) -> Option<&AuthFailure> {
        match self {
            Self::Failure(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Where the coordinator is within the current attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlowPhase {
    #[default]
    Idle,
    Redirecting,
    Completing,
    Succeeded,
    Failed,
    OperationCompleted,
}

impl From<&AuthOutcome> for FlowPhase {
    fn from(outcome: &AuthOutcome) -> Self {
        match outcome {
            AuthOutcome::InProgress => Self::Redirecting,
            AuthOutcome::Success(_) => Self::Succeeded,
            AuthOutcome::Failure(_) => Self::Failed,
            AuthOutcome::OperationCompleted => Self::OperationCompleted,
        }
    }
}
