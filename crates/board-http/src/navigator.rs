//! Navigation side effects
//!
//! Fatal failures end the current flow by sending the user somewhere else.
//! The client only decides *where*; the embedder decides what navigating
//! means (a browser location change, a CLI exit message, a recorded event).

use std::fmt;
use std::sync::Mutex;

use tracing::warn;

/// Static maintenance page shown for fatal infrastructure failures
pub const MAINTENANCE_PATH: &str = "/maintenance.html";

/// Login page shown when authentication cannot be recovered
pub const LOGIN_PATH: &str = "/login";

/// Where the client sends the user after a terminal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Redirect {
    /// 413, 503, or no response at all
    Maintenance,
    /// Unrecoverable 401
    Login,
}

impl Redirect {
    pub fn path(&self) -> &'static str {
        match self {
            Redirect::Maintenance => MAINTENANCE_PATH,
            Redirect::Login => LOGIN_PATH,
        }
    }

    /// Label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Redirect::Maintenance => "maintenance",
            Redirect::Login => "login",
        }
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Receives terminal navigation requests from the client.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: Redirect);
}

/// Navigator that only logs. Default for headless embedders.
#[derive(Debug, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, target: Redirect) {
        warn!(target = %target, "navigation requested");
    }
}

/// Navigator that records every request, in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<Redirect>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<Redirect> {
        self.visits
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: Redirect) {
        if let Ok(mut visits) = self.visits.lock() {
            visits.push(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_paths() {
        assert_eq!(Redirect::Maintenance.to_string(), "/maintenance.html");
        assert_eq!(Redirect::Login.to_string(), "/login");
    }

    #[test]
    fn recording_navigator_keeps_order() {
        let nav = RecordingNavigator::new();
        assert!(nav.visits().is_empty());

        nav.navigate(Redirect::Login);
        nav.navigate(Redirect::Maintenance);

        assert_eq!(nav.visits(), vec![Redirect::Login, Redirect::Maintenance]);
    }
}
