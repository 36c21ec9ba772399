//! Session state publisher.
//!
//! DESIGN
//! ======
//! One publisher exists per running application and is handed to whatever
//! needs it; there is no global. Reads are non-blocking snapshots. Writes
//! swap the whole value, so a reader never sees a partly updated session.
//!
//! Everything runs on the single UI thread, so `Rc` + `RefCell` is enough.
//! A publish issued from inside a listener is queued and delivered after the
//! current one has reached every listener, which keeps the sequence each
//! listener observes identical to the publish order.
//!
//! LISTENER FAULTS
//! ===============
//! A listener reports failure by returning `Err`; the publisher logs it and
//! moves on to the next listener. Browser builds abort on panic, so a panic
//! cannot be contained there. Where the target unwinds, panics are caught
//! and treated like an `Err`.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::Display;
use std::rc::{Rc, Weak};

use crate::net::authenticator::Identity;

/// Authentication state as seen by the rest of the application.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated(Identity),
    /// Last attempt failed; carries the user-visible reason.
    Error(String),
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    /// Short status label: `anonymous`, `authenticating`, `authenticated`, `error`.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Authenticating => "authenticating",
            Self::Authenticated(_) => "authenticated",
            Self::Error(_) => "error",
        }
    }
}

type Listener = Rc<dyn Fn(&SessionState) -> Result<(), String>>;

struct Inner {
    current: Rc<SessionState>,
    revision: u64,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
    pending: VecDeque<Rc<SessionState>>,
    notifying: bool,
}

/// Single-writer, many-reader holder of the current [`SessionState`].
///
/// Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct SessionPublisher {
    inner: Rc<RefCell<Inner>>,
}

impl Default for SessionPublisher {
    fn default() -> Self {
        Self::new(SessionState::default())
    }
}

impl SessionPublisher {
    #[must_use]
    pub fn new(initial: SessionState) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                current: Rc::new(initial),
                revision: 0,
                listeners: Vec::new(),
                next_listener_id: 0,
                pending: VecDeque::new(),
                notifying: false,
            })),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn current(&self) -> Rc<SessionState> {
        Rc::clone(&self.inner.borrow().current)
    }

    /// Number of publishes applied so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.inner.borrow().revision
    }

    /// Register a listener for every subsequent state change.
    ///
    /// The listener is not called with the current value. A listener added
    /// while a publish is being delivered first hears the next one.
    /// Dropping the returned handle leaves the listener registered.
    ///
    /// A panic inside `listener` is only contained on targets that unwind;
    /// on `wasm32` it aborts the application. Listeners that can fail should
    /// use [`SessionPublisher::try_subscribe`].
    pub fn subscribe(&self, listener: impl Fn(&SessionState) + 'static) -> Subscription {
        self.register(Rc::new(move |state: &SessionState| {
            listener(state);
            Ok(())
        }))
    }

    /// Register a listener that may fail. An `Err` is logged and skipped;
    /// the listener stays registered for later publishes.
    pub fn try_subscribe<E>(&self, listener: impl Fn(&SessionState) -> Result<(), E> + 'static) -> Subscription
    where
        E: Display,
    {
        self.register(Rc::new(move |state: &SessionState| listener(state).map_err(|e| e.to_string())))
    }

    fn register(&self, listener: Listener) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.push((id, listener));
        Subscription { id, publisher: Rc::downgrade(&self.inner) }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Replace the current state and notify listeners in registration order.
    ///
    /// Never fails. A listener that returns `Err` (or panics, where panics
    /// unwind) is logged and skipped; the remaining listeners and later
    /// publishes are unaffected.
    pub(crate) fn publish(&self, next: SessionState) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.pending.push_back(Rc::new(next));
            if inner.notifying {
                return;
            }
            inner.notifying = true;
        }

        loop {
            let (state, listeners) = {
                let mut inner = self.inner.borrow_mut();
                let Some(state) = inner.pending.pop_front() else {
                    inner.notifying = false;
                    return;
                };
                inner.current = Rc::clone(&state);
                inner.revision += 1;
                let listeners: Vec<Listener> = inner.listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
                (state, listeners)
            };

            for listener in listeners {
                if let Err(reason) = notify(&listener, &state) {
                    leptos::logging::warn!("session listener failed on '{}' update: {reason}", state.label());
                }
            }
        }
    }
}

#[cfg(panic = "unwind")]
fn notify(listener: &Listener, state: &SessionState) -> Result<(), String> {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    catch_unwind(AssertUnwindSafe(|| listener(state))).unwrap_or_else(|_| Err("listener panicked".to_owned()))
}

#[cfg(not(panic = "unwind"))]
fn notify(listener: &Listener, state: &SessionState) -> Result<(), String> {
    listener(state)
}

/// Handle returned by [`SessionPublisher::subscribe`].
pub struct Subscription {
    id: u64,
    publisher: Weak<RefCell<Inner>>,
}

impl Subscription {
    /// Remove the listener. A delivery already in progress still reaches it.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.publisher.upgrade() {
            inner.borrow_mut().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
