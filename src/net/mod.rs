//! Capabilities consumed from outside the core: the identity provider client
//! and application navigation.

pub mod authenticator;
pub mod navigation;
