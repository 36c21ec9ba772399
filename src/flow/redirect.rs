//! Post-completion redirect policy.
//!
//! SYSTEM CONTEXT
//! ==============
//! Return URLs travel through the provider and back in the query string, so
//! they are attacker-influenced. Only same-origin local paths are followed;
//! anything else silently becomes the home path. Logout confirmation always
//! lands on home.

#[cfg(test)]
#[path = "redirect_test.rs"]
mod redirect_test;

use url::Url;

use super::outcome::AuthOutcome;
use crate::action::AuthAction;
use crate::config::AuthConfig;
use crate::error::ConfigError;

/// Base used to resolve local paths when no origin is configured.
const LOCAL_BASE: &str = "http://localhost/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    NavigateTo(String),
    NoOp,
}

#[derive(Clone, Debug)]
pub struct RedirectPolicy {
    home: String,
    origin: Option<Url>,
}

impl RedirectPolicy {
    #[must_use]
    pub fn new(home: impl Into<String>, origin: Option<Url>) -> Self {
        Self { home: home.into(), origin }
    }

    /// # Errors
    ///
    /// Returns an error if the configured origin does not parse.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.home_path.clone(), config.origin_url()?))
    }

    #[must_use]
    pub fn home(&self) -> &str {
        &self.home
    }

    /// Decide where to go after `action` produced `outcome`.
    #[must_use]
    pub fn decide(&self, outcome: &AuthOutcome, action: AuthAction) -> Navigation {
        if !outcome.is_success() || action == AuthAction::Unknown {
            return Navigation::NoOp;
        }
        if action == AuthAction::LogOutSucceeded {
            return Navigation::NavigateTo(self.home.clone());
        }

        let requested = match outcome {
            AuthOutcome::Success(return_url) => return_url.as_deref(),
            _ => None,
        };
        match (requested, action) {
            (Some(raw), _) => Navigation::NavigateTo(self.local_target(raw).unwrap_or_else(|| {
                leptos::logging::warn!("auth: refusing non-local return url {raw:?}");
                self.home.clone()
            })),
            // A background refresh has nowhere to go back to.
            (None, AuthAction::TokenRefresh) => Navigation::NoOp,
            (None, _) => Navigation::NavigateTo(self.home.clone()),
        }
    }

    /// Reduce `raw` to a same-origin path (with query and fragment), or
    /// `None` when it would leave the application.
    #[must_use]
    pub fn local_target(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() || raw.contains('\\') || raw.chars().any(char::is_control) {
            return None;
        }

        let base = match &self.origin {
            Some(origin) => origin.clone(),
            None => Url::parse(LOCAL_BASE).ok()?,
        };
        let resolved = if raw.starts_with('/') {
            if raw.starts_with("//") {
                return None;
            }
            base.join(raw).ok()?
        } else {
            // Absolute URLs only pass when an origin is configured and matches.
            let absolute = Url::parse(raw).ok()?;
            self.origin.as_ref()?;
            absolute
        };
        if resolved.origin() != base.origin() {
            return None;
        }

        let mut target = resolved.path().to_owned();
        if let Some(query) = resolved.query() {
            target.push('?');
            target.push_str(query);
        }
        if let Some(fragment) = resolved.fragment() {
            target.push('#');
            target.push_str(fragment);
        }
        // Dot segments can collapse into a network-path reference.
        if target.starts_with("//") || target.starts_with("/\\") {
            return None;
        }
        Some(target)
    }
}
