//! Authentication routing configuration.
//!
//! DESIGN
//! ======
//! Loaded once at startup (typically from a JSON blob embedded in the page)
//! and shared read-only for the application's lifetime. Every field has a
//! default so an empty object is a valid config.

use serde::Deserialize;
use url::Url;

use crate::action::AuthAction;
use crate::error::ConfigError;

pub const DEFAULT_BASE_PATH: &str = "authentication";
pub const DEFAULT_HOME_PATH: &str = "/";
pub const DEFAULT_REFRESH_LEEWAY_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthConfig {
    /// Route prefix the authentication page is mounted under, without slashes.
    pub base_path: String,
    /// Known-safe landing page.
    pub home_path: String,
    /// Application origin, e.g. `https://app.example`. Absolute return URLs
    /// are accepted only when they match it.
    pub origin: Option<String>,
    /// Identities expiring within this window are due for refresh.
    pub refresh_leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_owned(),
            home_path: DEFAULT_HOME_PATH.to_owned(),
            origin: None,
            refresh_leeway_secs: DEFAULT_REFRESH_LEEWAY_SECS,
        }
    }
}

impl AuthConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails [`AuthConfig::validate`].
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that paths are local and the origin parses.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a non-local home path or a base
    /// path containing separators, and [`ConfigError::Origin`] for an
    /// unparseable origin.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.home_path.starts_with('/') || self.home_path.starts_with("//") {
            return Err(ConfigError::Invalid(format!(
                "homePath must be a local absolute path, got '{}'",
                self.home_path
            )));
        }
        let base = self.base_path.trim_matches('/');
        if base.is_empty() || base.contains(['/', '\\', '?', '#']) {
            return Err(ConfigError::Invalid(format!(
                "basePath must be a single path segment, got '{}'",
                self.base_path
            )));
        }
        self.origin_url()?;
        Ok(())
    }

    /// Parsed application origin, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Origin`] when the configured origin is not a URL.
    pub fn origin_url(&self) -> Result<Option<Url>, ConfigError> {
        self.origin
            .as_deref()
            .map(|origin| {
                Url::parse(origin).map_err(|source| ConfigError::Origin { origin: origin.to_owned(), source })
            })
            .transpose()
    }

    /// Local route for an action, e.g. `/authentication/LogInCallback`.
    #[must_use]
    pub fn action_path(&self, action: AuthAction) -> String {
        format!("/{}/{}", self.base_path.trim_matches('/'), action.token())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
