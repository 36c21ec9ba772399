use super::*;
use std::cell::RefCell;

fn recorder(publisher: &SessionPublisher) -> (Rc<RefCell<Vec<SessionState>>>, Subscription) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let sub = publisher.subscribe(move |state| sink.borrow_mut().push(state.clone()));
    (seen, sub)
}

fn alice() -> Identity {
    Identity::new("u-1", "Alice")
}

// =============================================================
// SessionState
// =============================================================

#[test]
fn session_state_default_is_anonymous() {
    assert_eq!(SessionState::default(), SessionState::Anonymous);
    assert!(!SessionState::default().is_authenticated());
}

#[test]
fn session_state_identity_only_when_authenticated() {
    assert_eq!(SessionState::Authenticated(alice()).identity(), Some(&alice()));
    assert!(SessionState::Error("x".to_owned()).identity().is_none());
}

#[test]
fn session_state_labels() {
    assert_eq!(SessionState::Anonymous.label(), "anonymous");
    assert_eq!(SessionState::Authenticating.label(), "authenticating");
    assert_eq!(SessionState::Authenticated(alice()).label(), "authenticated");
    assert_eq!(SessionState::Error(String::new()).label(), "error");
}

// =============================================================
// SessionPublisher
// =============================================================

#[test]
fn current_reflects_latest_publish() {
    let publisher = SessionPublisher::default();
    assert_eq!(*publisher.current(), SessionState::Anonymous);
    publisher.publish(SessionState::Authenticated(alice()));
    assert_eq!(*publisher.current(), SessionState::Authenticated(alice()));
    assert_eq!(publisher.revision(), 1);
}

#[test]
fn earlier_snapshot_is_not_mutated_by_publish() {
    let publisher = SessionPublisher::default();
    let before = publisher.current();
    publisher.publish(SessionState::Authenticating);
    assert_eq!(*before, SessionState::Anonymous);
}

#[test]
fn listeners_see_every_publish_in_order() {
    let publisher = SessionPublisher::default();
    let (first, _a) = recorder(&publisher);
    let (second, _b) = recorder(&publisher);

    let sequence = vec![
        SessionState::Authenticating,
        SessionState::Authenticated(alice()),
        SessionState::Error("provider communication error".to_owned()),
    ];
    for state in sequence.clone() {
        publisher.publish(state);
    }

    assert_eq!(*first.borrow(), sequence);
    assert_eq!(*second.borrow(), sequence);
}

#[test]
fn subscribe_does_not_replay_current_value() {
    let publisher = SessionPublisher::new(SessionState::Authenticated(alice()));
    let (seen, _sub) = recorder(&publisher);
    assert!(seen.borrow().is_empty());
}

#[test]
fn unsubscribe_stops_delivery() {
    let publisher = SessionPublisher::default();
    let (seen, sub) = recorder(&publisher);
    publisher.publish(SessionState::Authenticating);
    sub.unsubscribe();
    publisher.publish(SessionState::Anonymous);
    assert_eq!(*seen.borrow(), vec![SessionState::Authenticating]);
    assert_eq!(publisher.listener_count(), 0);
}

#[test]
fn unsubscribe_after_publisher_dropped_is_harmless() {
    let publisher = SessionPublisher::default();
    let (_seen, sub) = recorder(&publisher);
    drop(publisher);
    sub.unsubscribe();
}

#[test]
fn failing_listener_is_skipped_and_stays_registered() {
    let publisher = SessionPublisher::default();
    let attempts = Rc::new(RefCell::new(0_u32));
    let counter = Rc::clone(&attempts);
    let _flaky = publisher.try_subscribe(move |state| {
        *counter.borrow_mut() += 1;
        match state {
            SessionState::Authenticating => Err("view torn down"),
            _ => Ok(()),
        }
    });
    let (seen, _sub) = recorder(&publisher);

    publisher.publish(SessionState::Authenticating);
    publisher.publish(SessionState::Authenticated(alice()));

    assert_eq!(*seen.borrow(), vec![SessionState::Authenticating, SessionState::Authenticated(alice())]);
    assert_eq!(*attempts.borrow(), 2);
    assert_eq!(publisher.listener_count(), 2);
}

#[test]
fn failing_listener_does_not_block_queued_publish() {
    let publisher = SessionPublisher::default();
    let writer = publisher.clone();
    let _chain = publisher.try_subscribe(move |state| {
        if matches!(state, SessionState::Authenticating) {
            writer.publish(SessionState::Anonymous);
            return Err("gave up");
        }
        Ok(())
    });
    let (seen, _sub) = recorder(&publisher);

    publisher.publish(SessionState::Authenticating);

    assert_eq!(*seen.borrow(), vec![SessionState::Authenticating, SessionState::Anonymous]);
    assert_eq!(*publisher.current(), SessionState::Anonymous);
}

#[cfg(panic = "unwind")]
#[test]
fn panicking_listener_is_isolated() {
    let publisher = SessionPublisher::default();
    let _bad = publisher.subscribe(|state| {
        if matches!(state, SessionState::Authenticating) {
            panic!("listener bug");
        }
    });
    let (seen, _sub) = recorder(&publisher);

    publisher.publish(SessionState::Authenticating);
    publisher.publish(SessionState::Authenticated(alice()));

    assert_eq!(*seen.borrow(), vec![SessionState::Authenticating, SessionState::Authenticated(alice())]);
    assert_eq!(*publisher.current(), SessionState::Authenticated(alice()));
}

#[test]
fn publish_from_listener_is_delivered_after_current_round() {
    let publisher = SessionPublisher::default();
    let writer = publisher.clone();
    let _chain = publisher.subscribe(move |state| {
        if matches!(state, SessionState::Authenticating) {
            writer.publish(SessionState::Authenticated(Identity::new("u-1", "Alice")));
        }
    });
    let (seen, _sub) = recorder(&publisher);

    publisher.publish(SessionState::Authenticating);

    assert_eq!(*seen.borrow(), vec![SessionState::Authenticating, SessionState::Authenticated(alice())]);
    assert_eq!(publisher.revision(), 2);
}

#[test]
fn listener_added_mid_delivery_gets_next_state_only() {
    let publisher = SessionPublisher::default();
    let late_seen: Rc<RefCell<Vec<SessionState>>> = Rc::new(RefCell::new(Vec::new()));
    let handle = publisher.clone();
    let sink = Rc::clone(&late_seen);
    let registered = Rc::new(RefCell::new(false));
    let _adder = publisher.subscribe(move |_| {
        if !*registered.borrow() {
            *registered.borrow_mut() = true;
            let sink = Rc::clone(&sink);
            let _late = handle.subscribe(move |state| sink.borrow_mut().push(state.clone()));
        }
    });

    publisher.publish(SessionState::Authenticating);
    assert!(late_seen.borrow().is_empty());

    publisher.publish(SessionState::Anonymous);
    assert_eq!(*late_seen.borrow(), vec![SessionState::Anonymous]);
}
