//! Light/dark theme preference persisted in a key-value store.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::error::{DirectoryError, Result};

pub const THEME_KEY: &str = "countries-theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String key-value storage, the moral equivalent of browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local storage, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.values.lock().map_err(|_| DirectoryError::Storage {
            message: "memory store lock poisoned".into(),
        })
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk; the file is created on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => serde_json::from_str(&text).map_err(|e| DirectoryError::Storage {
                message: format!("{} is not a JSON object of strings: {e}", self.path.display()),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(DirectoryError::Storage {
                message: format!("failed to read {}: {e}", self.path.display()),
            }),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DirectoryError::Storage {
                message: format!("failed to create {}: {e}", parent.display()),
            })?;
        }
        let text = serde_json::to_string_pretty(&values).map_err(|e| DirectoryError::Storage {
            message: format!("failed to encode preferences: {e}"),
        })?;
        std::fs::write(&self.path, text).map_err(|e| DirectoryError::Storage {
            message: format!("failed to write {}: {e}", self.path.display()),
        })
    }
}

/// Current theme plus its persistence.
pub struct ThemePreference<S: KeyValueStore> {
    store: S,
    theme: Theme,
}

impl<S: KeyValueStore> ThemePreference<S> {
    /// Stored value if valid, otherwise the platform preference.
    ///
    /// A resolved default is written back so later runs start from it.
    pub fn load(store: S, prefers_dark: bool) -> Result<Self> {
        let saved = store.get(THEME_KEY)?;
        let theme = match saved.as_deref().and_then(Theme::parse) {
            Some(theme) => theme,
            None => {
                let theme = if prefers_dark { Theme::Dark } else { Theme::Light };
                store.set(THEME_KEY, theme.as_str())?;
                theme
            }
        };
        debug!(theme = %theme, saved = ?saved, "theme resolved");
        Ok(Self { store, theme })
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set(&mut self, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str())?;
        self.theme = theme;
        info!(theme = %theme, "theme saved");
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<Theme> {
        let next = self.theme.toggled();
        self.set(next)?;
        Ok(next)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
