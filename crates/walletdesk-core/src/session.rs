//! Persisted client state the core reads but never writes: the selected
//! language and the auth token.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::Deserialize;
use tracing::warn;

use crate::i18n::Language;

/// Read-only view over persisted session state.
pub trait SessionStore: Send + Sync {
    /// Stored language key (e.g. `en`, `tr`), if any.
    fn language(&self) -> Option<String>;

    /// Stored bearer token, if any.
    fn token(&self) -> Option<String>;

    /// Language used for localized messages.
    fn resolved_language(&self) -> Language {
        self.language()
            .as_deref()
            .and_then(Language::parse)
            .unwrap_or_default()
    }
}

/// In-process session state, filled by the embedding application.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<SessionState>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
struct SessionState {
    #[serde(default, alias = "i18nextLng")]
    language: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

impl MemorySessionStore {
    pub fn new(language: Option<String>, token: Option<String>) -> Self {
        Self {
            inner: RwLock::new(SessionState { language, token }),
        }
    }

    pub fn set_language(&self, language: Option<String>) {
        let mut state = self.inner.write().unwrap_or_else(|e| e.into_inner());
        state.language = language;
    }

    pub fn set_token(&self, token: Option<String>) {
        let mut state = self.inner.write().unwrap_or_else(|e| e.into_inner());
        state.token = token;
    }
}

impl SessionStore for MemorySessionStore {
    fn language(&self) -> Option<String> {
        let state = self.inner.read().unwrap_or_else(|e| e.into_inner());
        state.language.clone()
    }

    fn token(&self) -> Option<String> {
        let state = self.inner.read().unwrap_or_else(|e| e.into_inner());
        state.token.clone()
    }
}

/// Session state persisted as a JSON document, re-read on every access.
///
/// ```json
/// { "language": "tr", "token": "..." }
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileSessionStore {
    path: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> SessionState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return SessionState::default(),
        };

        serde_json::from_str(&raw).unwrap_or_else(|error| {
            warn!(path = %self.path.display(), %error, "ignoring unreadable session file");
            SessionState::default()
        })
    }
}

impl SessionStore for JsonFileSessionStore {
    fn language(&self) -> Option<String> {
        self.load().language.filter(|value| !value.is_empty())
    }

    fn token(&self) -> Option<String> {
        self.load().token.filter(|value| !value.is_empty())
    }
}
