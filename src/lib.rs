//! # authflow
//!
//! Client-side authentication flow coordinator for a Leptos single-page
//! application that delegates identity to a remote OIDC/OAuth2 provider.
//!
//! A route action (`/authentication/{action}`) is resolved to an intent,
//! driven to an outcome against the provider client, and turned into a
//! navigation decision and a session state update. The provider protocol
//! itself stays behind the [`RemoteAuthenticator`] capability.

pub mod action;
pub mod app;
pub mod config;
pub mod error;
pub mod flow;
pub mod net;
pub mod pages;
pub mod state;

pub use action::{AuthAction, AuthIntent, resolve};
pub use app::AuthApp;
pub use config::AuthConfig;
pub use error::{AuthFailure, AuthenticatorError, ConfigError};
pub use flow::{AuthOutcome, FlowCoordinator, FlowPhase, Navigation, RedirectPolicy};
pub use net::authenticator::{Identity, RemoteAuthenticator};
pub use net::navigation::Navigator;
pub use state::session::{SessionPublisher, SessionState, Subscription};
