use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::warn;

/// Invoked when the session cannot be recovered and the user has to sign in again.
pub trait SessionHook: Send + Sync {
    fn on_session_invalid(&self);
}

impl<F> SessionHook for F
where
    F: Fn() + Send + Sync,
{
    fn on_session_invalid(&self) {
        self()
    }
}

/// Points the user at the login surface and remembers how often that happened.
pub struct LoginRedirectHook {
    login_url: String,
    fired: AtomicUsize,
}

impl LoginRedirectHook {
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
            fired: AtomicUsize::new(0),
        }
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    pub fn fired(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }
}

impl SessionHook for LoginRedirectHook {
    fn on_session_invalid(&self) {
        self.fired.fetch_add(1, Ordering::SeqCst);
        warn!(login_url = %self.login_url, "session.redirect_to_login");
    }
}
