//! Shared client-side authentication state.
//!
//! DESIGN
//! ======
//! `session` owns the authoritative value and its listener list; `signal`
//! mirrors it into Leptos for components.

pub mod session;
pub mod signal;
