//! Session store: who is logged in and which credentials authorize requests
//!
//! Only `{user, isAuthenticated}` is persisted in the `auth-storage` blob.
//! Tokens are mirrored into the raw `accessToken` / `refreshToken` keys,
//! which is where the API gateway reads them from.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use common::KeyValueStorage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{User, UserRole};
use crate::persist;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const AUTH_STORAGE_KEY: &str = "auth-storage";

/// Credentials accepted by the offline login flow
pub const DEMO_EMAIL: &str = "admin@masoud.com";
pub const DEMO_PASSWORD: &str = "admin123";
const DEMO_ACCESS_TOKEN: &str = "mock-access-token";
const DEMO_REFRESH_TOKEN: &str = "mock-refresh-token";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("بيانات الدخول غير صحيحة")]
    InvalidCredentials,
}

/// In-memory session state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    is_authenticated: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSessionRef<'a> {
    user: Option<&'a User>,
    is_authenticated: bool,
}

/// Session store handle
///
/// Every mutation is a total function: durable storage failures are logged
/// and the in-memory state is still updated.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    state: RwLock<Session>,
}

impl SessionStore {
    /// Create a store, reading the persisted session once
    pub fn hydrate(storage: Arc<dyn KeyValueStorage>) -> Self {
        let persisted: PersistedSession =
            persist::hydrate(storage.as_ref(), AUTH_STORAGE_KEY).unwrap_or_default();

        if let Some(user) = &persisted.user {
            info!("Restored session for user: {}", user.email);
        }

        let state = Session {
            user: persisted.user,
            access_token: None,
            refresh_token: None,
            is_authenticated: persisted.is_authenticated,
        };

        Self {
            storage,
            state: RwLock::new(state),
        }
    }

    /// Copy of the current session
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated
    }

    /// Replace the current user and mark the session authenticated
    pub fn set_user(&self, user: User) {
        let mut state = self.write();
        info!("Setting session user: {}", user.email);
        state.user = Some(user);
        state.is_authenticated = true;
        self.persist(&state);
    }

    /// Store freshly issued credentials
    pub fn set_tokens(&self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        let access_token = access_token.into();
        let refresh_token = refresh_token.into();

        let mut state = self.write();
        self.write_raw(ACCESS_TOKEN_KEY, &access_token);
        self.write_raw(REFRESH_TOKEN_KEY, &refresh_token);

        state.access_token = Some(access_token);
        state.refresh_token = Some(refresh_token);
        state.is_authenticated = true;
        self.persist(&state);
    }

    /// Offline login: checks the demo credentials, then stores the user
    /// and the mock token pair. Nothing changes on failure.
    pub fn login(&self, email: &str, password: &str) -> Result<User, LoginError> {
        if email != DEMO_EMAIL || password != DEMO_PASSWORD {
            warn!("Rejected login for {}", email);
            return Err(LoginError::InvalidCredentials);
        }

        let user = User::new("1", email, "المدير التنفيذي", UserRole::Viewer);
        self.set_user(user.clone());
        self.set_tokens(DEMO_ACCESS_TOKEN, DEMO_REFRESH_TOKEN);
        Ok(user)
    }

    /// Drop credentials and reset to the empty session.
    ///
    /// Purely local: no server-side revocation happens here.
    pub fn logout(&self) {
        let mut state = self.write();
        self.remove_raw(ACCESS_TOKEN_KEY);
        self.remove_raw(REFRESH_TOKEN_KEY);

        *state = Session::default();
        self.persist(&state);
        info!("Session cleared");
    }

    fn persist(&self, state: &Session) {
        persist::persist(
            self.storage.as_ref(),
            AUTH_STORAGE_KEY,
            PersistedSessionRef {
                user: state.user.as_ref(),
                is_authenticated: state.is_authenticated,
            },
        );
    }

    fn write_raw(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set_item(key, value) {
            warn!("Failed to store {}: {}", key, e);
        }
    }

    fn remove_raw(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            warn!("Failed to remove {}: {}", key, e);
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}
