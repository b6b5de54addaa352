//! Route table and the session-expiry coordinator
//!
//! Everything except `/login` sits behind authentication. The gateway never
//! navigates by itself: it broadcasts [`AuthEvent::SessionExpired`] and the
//! [`AuthCoordinator`] moves the [`Navigator`] to the login page.

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::ReportType;
use crate::gateway::AuthEvent;
use crate::session::SessionStore;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/dashboard";
const REPORTS_PATH: &str = "/reports";

/// A page the client can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Report(ReportType),
    Analytics,
    Timeline,
}

impl Route {
    pub fn path(self) -> String {
        match self {
            Route::Login => LOGIN_PATH.to_string(),
            Route::Dashboard => HOME_PATH.to_string(),
            Route::Report(kind) => format!("{}/{}", REPORTS_PATH, kind.slug()),
            Route::Analytics => "/analytics".to_string(),
            Route::Timeline => "/timeline".to_string(),
        }
    }
}

/// Outcome of resolving a location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(Route),
    Redirect(String),
}

/// Resolve `path` for a user who is or is not logged in
pub fn resolve(path: &str, is_authenticated: bool) -> Resolution {
    let path = normalize(path);

    if path == LOGIN_PATH {
        return Resolution::Render(Route::Login);
    }
    if !is_authenticated {
        return Resolution::Redirect(LOGIN_PATH.to_string());
    }

    match path {
        "/" => Resolution::Redirect(HOME_PATH.to_string()),
        HOME_PATH => Resolution::Render(Route::Dashboard),
        REPORTS_PATH => Resolution::Redirect(Route::Report(ReportType::ProjectProgress).path()),
        "/analytics" => Resolution::Render(Route::Analytics),
        "/timeline" => Resolution::Render(Route::Timeline),
        other => match other
            .strip_prefix("/reports/")
            .and_then(|slug| slug.parse::<ReportType>().ok())
        {
            Some(kind) => Resolution::Render(Route::Report(kind)),
            None => Resolution::Redirect(HOME_PATH.to_string()),
        },
    }
}

/// Drop query, fragment and trailing slashes
fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// Current client location
#[derive(Debug)]
pub struct Navigator {
    location: RwLock<String>,
}

impl Navigator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            location: RwLock::new(initial.into()),
        }
    }

    pub fn location(&self) -> String {
        self.location
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the current location without resolving it
    pub fn replace(&self, path: impl Into<String>) {
        let path = path.into();
        debug!("Location replaced with {}", path);
        *self.location.write().unwrap_or_else(|e| e.into_inner()) = path;
    }

    /// Follow redirects from `path` and settle on the page to render
    pub fn navigate(&self, path: &str, is_authenticated: bool) -> Route {
        let mut target = path.to_string();
        loop {
            match resolve(&target, is_authenticated) {
                Resolution::Render(route) => {
                    self.replace(route.path());
                    return route;
                }
                Resolution::Redirect(next) => {
                    debug!("Redirecting {} -> {}", target, next);
                    target = next;
                }
            }
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(HOME_PATH)
    }
}

/// Reacts to expired sessions by logging out and showing the login page
pub struct AuthCoordinator {
    handle: JoinHandle<()>,
}

impl AuthCoordinator {
    /// Start listening on `events` until the sender side is dropped
    pub fn spawn(
        mut events: broadcast::Receiver<AuthEvent>,
        navigator: Arc<Navigator>,
        session: Arc<SessionStore>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(AuthEvent::SessionExpired) => {
                        info!("Session expired, returning to login");
                        session.logout();
                        navigator.replace(LOGIN_PATH);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Auth coordinator skipped {} events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Self { handle }
    }

    /// Wait for the listener to finish
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            warn!("Auth coordinator stopped abnormally: {}", e);
        }
    }

    pub fn abort(&self) {
        self.handle.abort();
    }
}
