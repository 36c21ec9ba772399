use super::*;
use crate::error::{AuthFailure, AuthenticatorError};
use crate::net::authenticator::{Identity, RemoteStatus, RemoteSuccess, SignInRequest, SignOutRequest};
use async_trait::async_trait;
use std::cell::RefCell;
use std::rc::Rc;

// =========================================================================
// Fakes
// =========================================================================

struct FakeProvider {
    complete_login: Result<RemoteStatus, AuthenticatorError>,
    refresh: Result<RemoteStatus, AuthenticatorError>,
    stored: Option<Identity>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            complete_login: Err(AuthenticatorError::Communication("offline".to_owned())),
            refresh: Err(AuthenticatorError::Unsupported("token refresh")),
            stored: None,
        }
    }
}

#[async_trait(?Send)]
impl RemoteAuthenticator for FakeProvider {
    async fn begin_login(&self, _request: &SignInRequest) -> Result<RemoteStatus, AuthenticatorError> {
        Ok(RemoteStatus::Redirect)
    }

    async fn complete_login(&self, _callback_url: &str) -> Result<RemoteStatus, AuthenticatorError> {
        self.complete_login.clone()
    }

    async fn begin_logout(&self, _request: &SignOutRequest) -> Result<RemoteStatus, AuthenticatorError> {
        Ok(RemoteStatus::Redirect)
    }

    async fn complete_logout(&self, _callback_url: &str) -> Result<RemoteStatus, AuthenticatorError> {
        Ok(RemoteStatus::Success(RemoteSuccess::default()))
    }

    async fn refresh(&self) -> Result<RemoteStatus, AuthenticatorError> {
        self.refresh.clone()
    }

    async fn current_identity(&self) -> Result<Option<Identity>, AuthenticatorError> {
        Ok(self.stored.clone())
    }
}

type Visits = Rc<RefCell<Vec<String>>>;

fn app(provider: FakeProvider) -> (AuthApp<FakeProvider, impl Fn(&str)>, Visits) {
    let visits: Visits = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&visits);
    let navigator = move |path: &str| sink.borrow_mut().push(path.to_owned());
    let app = AuthApp::new(AuthConfig::default(), provider, navigator).expect("app");
    (app, visits)
}

fn alice() -> Identity {
    Identity::new("u-1", "Alice")
}

fn logged_in(return_url: &str) -> Result<RemoteStatus, AuthenticatorError> {
    Ok(RemoteStatus::Success(RemoteSuccess {
        correlation_id: Some("s-1".to_owned()),
        identity: Some(alice()),
        return_url: Some(return_url.to_owned()),
    }))
}

// =========================================================================
// Scenarios
// =========================================================================

#[tokio::test]
async fn logout_succeeded_navigates_home() {
    let (app, visits) = app(FakeProvider::default());

    let outcome = app.handle_route(Some("LogOutSucceeded"), "/authentication/LogOutSucceeded").await;

    assert_eq!(outcome, AuthOutcome::Success(None));
    assert_eq!(*visits.borrow(), vec!["/".to_owned()]);
    assert_eq!(*app.session().current(), SessionState::Anonymous);
}

#[tokio::test]
async fn login_callback_network_error_shows_error_without_navigation() {
    let (app, visits) = app(FakeProvider::default());

    let outcome = app.handle_route(Some("LogInCallback"), "/authentication/LogInCallback?state=s-1").await;

    assert_eq!(outcome.failure().map(ToString::to_string).as_deref(), Some("provider communication error"));
    assert_eq!(app.session().current().label(), "error");
    assert!(visits.borrow().is_empty());
}

#[tokio::test]
async fn unrecognized_action_fails_without_navigation() {
    let (app, visits) = app(FakeProvider::default());

    let outcome = app.handle_route(Some("delete-account"), "/authentication/delete-account").await;

    assert_eq!(outcome, AuthOutcome::Failure(AuthFailure::UnsupportedAction));
    assert!(visits.borrow().is_empty());
}

#[tokio::test]
async fn missing_segment_is_unsupported() {
    let (app, _visits) = app(FakeProvider::default());

    let outcome = app.handle_route(None, "/authentication").await;

    assert_eq!(outcome, AuthOutcome::Failure(AuthFailure::UnsupportedAction));
}

#[tokio::test]
async fn login_callback_follows_local_return_url() {
    let provider = FakeProvider { complete_login: logged_in("/boards/7"), ..FakeProvider::default() };
    let (app, visits) = app(provider);

    app.handle_route(Some("LogInCallback"), "/authentication/LogInCallback").await;

    assert_eq!(*visits.borrow(), vec!["/boards/7".to_owned()]);
    assert!(app.session().current().is_authenticated());
}

#[tokio::test]
async fn login_callback_with_external_return_url_goes_home() {
    let provider = FakeProvider { complete_login: logged_in("https://evil.example/x"), ..FakeProvider::default() };
    let (app, visits) = app(provider);

    app.handle_route(Some("LogInCallback"), "/authentication/LogInCallback").await;

    assert_eq!(*visits.borrow(), vec!["/".to_owned()]);
}

#[tokio::test]
async fn login_leaves_navigation_to_provider() {
    let (app, visits) = app(FakeProvider::default());

    let outcome = app.handle_route(Some("LogIn"), "/authentication/LogIn?returnUrl=%2Fboards").await;

    assert_eq!(outcome, AuthOutcome::InProgress);
    assert!(visits.borrow().is_empty());
}

#[tokio::test]
async fn current_route_without_browser_uses_action_path() {
    let (app, visits) = app(FakeProvider::default());

    let outcome = app.handle_current_route(Some("LogOutSucceeded")).await;

    assert_eq!(outcome, AuthOutcome::Success(None));
    assert_eq!(*visits.borrow(), vec!["/".to_owned()]);
}

#[tokio::test]
async fn start_restores_stored_session() {
    let provider = FakeProvider { stored: Some(alice()), ..FakeProvider::default() };
    let (app, _visits) = app(provider);

    let state = app.start().await;

    assert_eq!(state, SessionState::Authenticated(alice()));
    assert_eq!(app.session().revision(), 2);
}

#[tokio::test]
async fn refresh_if_due_skips_fresh_sessions() {
    let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(400);
    let provider = FakeProvider {
        stored: Some(alice().expiring_at(now + time::Duration::hours(2))),
        ..FakeProvider::default()
    };
    let (app, _visits) = app(provider);
    app.start().await;

    assert!(app.refresh_if_due(now).await.is_none());
}

#[tokio::test]
async fn refresh_if_due_renews_expiring_session_without_navigation() {
    let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(400);
    let renewed = alice().expiring_at(now + time::Duration::hours(1));
    let provider = FakeProvider {
        stored: Some(alice().expiring_at(now + time::Duration::seconds(10))),
        refresh: Ok(RemoteStatus::Success(RemoteSuccess {
            correlation_id: None,
            identity: Some(renewed.clone()),
            return_url: None,
        })),
        ..FakeProvider::default()
    };
    let (app, visits) = app(provider);
    app.start().await;

    let outcome = app.refresh_if_due(now).await;

    assert_eq!(outcome, Some(AuthOutcome::Success(None)));
    assert_eq!(*app.session().current(), SessionState::Authenticated(renewed));
    assert!(visits.borrow().is_empty());
}

#[tokio::test]
async fn refresh_if_due_failure_keeps_session_without_navigation() {
    let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(400);
    let expiring = alice().expiring_at(now + time::Duration::seconds(10));
    let provider = FakeProvider {
        stored: Some(expiring.clone()),
        refresh: Err(AuthenticatorError::Communication("offline".to_owned())),
        ..FakeProvider::default()
    };
    let (app, visits) = app(provider);
    app.start().await;

    let outcome = app.refresh_if_due(now).await;

    assert!(matches!(outcome, Some(AuthOutcome::Failure(AuthFailure::ProviderCommunication(_)))));
    assert_eq!(*app.session().current(), SessionState::Authenticated(expiring));
    assert!(visits.borrow().is_empty());
}

#[tokio::test]
async fn dot_segment_return_url_goes_home() {
    let provider = FakeProvider { complete_login: logged_in("/.//evil.example/x"), ..FakeProvider::default() };
    let (app, visits) = app(provider);

    app.handle_route(Some("LogInCallback"), "/authentication/LogInCallback").await;

    assert_eq!(*visits.borrow(), vec!["/".to_owned()]);
}

#[test]
fn invalid_config_is_rejected() {
    let config = AuthConfig { home_path: "https://evil.example".to_owned(), ..AuthConfig::default() };
    let result = AuthApp::new(config, FakeProvider::default(), |_: &str| {});
    assert!(result.is_err());
}
