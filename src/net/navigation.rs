//! Navigation capability used to carry out redirect decisions.

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

use leptos_router::NavigateOptions;

/// Something that can move the application to a local path.
pub trait Navigator {
    fn navigate_to(&self, path: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str),
{
    fn navigate_to(&self, path: &str) {
        self(path);
    }
}

/// Adapts a `leptos_router` navigate function (`use_navigate()`).
///
/// Post-authentication navigation replaces the history entry so the back
/// button does not land on a consumed callback route.
#[derive(Clone)]
pub struct RouterNavigator<F> {
    navigate: F,
}

impl<F> RouterNavigator<F>
where
    F: Fn(&str, NavigateOptions),
{
    pub fn new(navigate: F) -> Self {
        Self { navigate }
    }
}

impl<F> Navigator for RouterNavigator<F>
where
    F: Fn(&str, NavigateOptions),
{
    fn navigate_to(&self, path: &str) {
        (self.navigate)(path, NavigateOptions { replace: true, ..NavigateOptions::default() });
    }
}

/// Full page navigation through `window.location`.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNavigator;

#[cfg(feature = "hydrate")]
impl Navigator for BrowserNavigator {
    fn navigate_to(&self, path: &str) {
        let Some(window) = web_sys::window() else {
            leptos::logging::warn!("no window; dropping navigation to {path}");
            return;
        };
        if let Err(e) = window.location().replace(path) {
            leptos::logging::error!("navigation to {path} failed: {e:?}");
        }
    }
}

/// Current page URL in the browser; `None` outside a browser.
#[must_use]
pub fn current_location() -> Option<String> {
    #[cfg(feature = "hydrate")]
    {
        web_sys::window().and_then(|w| w.location().href().ok())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        None
    }
}
