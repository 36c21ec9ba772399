//! Bridge from the session publisher into Leptos reactivity.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read the session through an `RwSignal` provided via context,
//! the same way other shared client state is exposed. The signal is a
//! mirror; the publisher stays the single source of truth.

#[cfg(test)]
#[path = "signal_test.rs"]
mod signal_test;

use leptos::prelude::*;

use super::session::{SessionPublisher, SessionState, Subscription};

/// Create a signal holding the current session and keep it in sync.
///
/// The signal is updated after each publish; unsubscribe through the
/// returned handle when the owning view is torn down. Publishes that arrive
/// after the signal was disposed are reported to the publisher and dropped.
pub fn bind_session_signal(publisher: &SessionPublisher) -> (RwSignal<SessionState>, Subscription) {
    let signal = RwSignal::new((*publisher.current()).clone());
    let subscription = publisher.try_subscribe(move |state| match signal.try_set(state.clone()) {
        None => Ok(()),
        Some(_) => Err("session signal disposed"),
    });
    (signal, subscription)
}
