//! UI preference store: theme, language, sidebar layout and saved filters
//!
//! The whole preference shape is persisted under `ui-storage` on every
//! mutation. Theme and language are mirrored onto the [`DocumentRoot`]
//! while the state lock is held, so the visible mode never lags the stored
//! preference.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard};

use common::KeyValueStorage;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{Language, Theme};
use crate::persist;

pub const UI_STORAGE_KEY: &str = "ui-storage";

/// Document-level display flags: dark mode, text direction and language
#[derive(Debug, Default)]
pub struct DocumentRoot {
    dark: AtomicBool,
    language: RwLock<Language>,
}

impl DocumentRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dark(&self) -> bool {
        self.dark.load(Ordering::SeqCst)
    }

    pub fn language(&self) -> Language {
        *self.language.read().unwrap_or_else(|e| e.into_inner())
    }

    /// `rtl` for Arabic, `ltr` for English
    pub fn direction(&self) -> &'static str {
        self.language().direction()
    }

    fn apply(&self, preferences: &UiPreferences) {
        self.dark.store(preferences.theme.is_dark(), Ordering::SeqCst);
        *self.language.write().unwrap_or_else(|e| e.into_inner()) = preferences.language;
    }
}

/// Persisted preference shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPreferences {
    pub theme: Theme,
    pub language: Language,
    pub sidebar_open: bool,
    pub sidebar_collapsed: bool,
    /// Caller-named report filters; values are opaque
    pub saved_filters: BTreeMap<String, Value>,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            language: Language::Ar,
            sidebar_open: true,
            sidebar_collapsed: false,
            saved_filters: BTreeMap::new(),
        }
    }
}

/// UI preference store handle
pub struct PreferenceStore {
    storage: Arc<dyn KeyValueStorage>,
    root: Arc<DocumentRoot>,
    state: RwLock<UiPreferences>,
}

impl PreferenceStore {
    /// Create a store from persisted preferences, falling back to defaults
    /// with `default_language` when nothing was persisted.
    pub fn hydrate(
        storage: Arc<dyn KeyValueStorage>,
        root: Arc<DocumentRoot>,
        default_language: Language,
    ) -> Self {
        let preferences = persist::hydrate(storage.as_ref(), UI_STORAGE_KEY).unwrap_or_else(|| {
            UiPreferences {
                language: default_language,
                ..UiPreferences::default()
            }
        });
        root.apply(&preferences);

        Self {
            storage,
            root,
            state: RwLock::new(preferences),
        }
    }

    /// Shared document root this store drives
    pub fn document_root(&self) -> &Arc<DocumentRoot> {
        &self.root
    }

    pub fn snapshot(&self) -> UiPreferences {
        self.read().clone()
    }

    pub fn theme(&self) -> Theme {
        self.read().theme
    }

    pub fn language(&self) -> Language {
        self.read().language
    }

    pub fn set_theme(&self, theme: Theme) {
        self.update(|state| state.theme = theme);
    }

    pub fn toggle_theme(&self) {
        self.update(|state| state.theme = state.theme.toggled());
    }

    pub fn set_language(&self, language: Language) {
        self.update(|state| state.language = language);
    }

    pub fn set_sidebar_open(&self, open: bool) {
        self.update(|state| state.sidebar_open = open);
    }

    pub fn toggle_sidebar(&self) {
        self.update(|state| state.sidebar_open = !state.sidebar_open);
    }

    pub fn set_sidebar_collapsed(&self, collapsed: bool) {
        self.update(|state| state.sidebar_collapsed = collapsed);
    }

    pub fn toggle_sidebar_collapsed(&self) {
        self.update(|state| state.sidebar_collapsed = !state.sidebar_collapsed);
    }

    /// Insert or replace the filter saved under `key`
    pub fn save_filter<T: Serialize>(&self, key: impl Into<String>, filter: &T) {
        let key = key.into();
        match serde_json::to_value(filter) {
            Ok(value) => self.update(|state| {
                state.saved_filters.insert(key, value);
            }),
            Err(e) => warn!("Not saving filter {}: {}", key, e),
        }
    }

    pub fn get_filter(&self, key: &str) -> Option<Value> {
        self.read().saved_filters.get(key).cloned()
    }

    /// Saved filter decoded into `T`; `None` when missing or of another shape
    pub fn get_filter_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_filter(key)?;
        serde_json::from_value(value).ok()
    }

    /// Remove the filter saved under `key`; missing keys are ignored
    pub fn clear_filter(&self, key: &str) {
        self.update(|state| {
            state.saved_filters.remove(key);
        });
    }

    fn update(&self, mutate: impl FnOnce(&mut UiPreferences)) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        mutate(&mut state);
        self.root.apply(&state);
        persist::persist(self.storage.as_ref(), UI_STORAGE_KEY, &*state);
        debug!(
            "UI preferences updated: theme={:?} language={}",
            state.theme, state.language
        );
    }

    fn read(&self) -> RwLockReadGuard<'_, UiPreferences> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }
}
