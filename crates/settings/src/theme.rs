//! Persisted light/dark preference.
//!
//! The preference lives under a single [`THEME_KEY`] in a small key-value
//! store. A stored `"light"` or `"dark"` wins; otherwise the configured
//! default applies, which in turn may follow the desktop colour scheme.
//! Storage problems never surface to the user: the controller keeps working
//! from memory for the rest of the session.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use caustics::{Theme, ThemeSource};
use tracing::{debug, warn};

use crate::ThemeDefault;

/// Key holding the persisted theme.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("failed to access preferences at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse preferences at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// String key-value store scoped to the current user.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
    fn remove(&mut self, key: &str) -> Result<(), PreferenceError>;
}

/// Session-only store; also the fallback when the file store is unusable.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    entries: BTreeMap<String, String>,
}

impl MemoryPreferenceStore {
    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.insert(key, value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PreferenceError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// TOML file of string entries, written through on every change.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FilePreferenceStore {
    /// Loads `path`; a missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, PreferenceError> {
        let entries = match fs::read_to_string(path) {
            Ok(contents) => {
                toml::from_str(&contents).map_err(|source| PreferenceError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(PreferenceError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Opens `path`, or logs why not and hands back an in-memory store.
    pub fn open_or_memory(path: &Path) -> Box<dyn PreferenceStore> {
        match Self::open(path) {
            Ok(store) => Box::new(store),
            Err(err) => {
                warn!(error = %err, "preferences unavailable; theme changes will not persist");
                Box::new(MemoryPreferenceStore::default())
            }
        }
    }

    fn persist(&self) -> Result<(), PreferenceError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|source| PreferenceError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let serialized = toml::to_string_pretty(&self.entries)?;
        fs::write(&self.path, serialized).map_err(|source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if previous.as_deref() == Some(value) {
            return Ok(());
        }
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), PreferenceError> {
        if self.entries.remove(key).is_none() {
            return Ok(());
        }
        self.persist()
    }
}

/// Resolves and updates the active theme.
///
/// The stored value is read once and again only after the controller changes
/// it, so per-frame [`ThemeSource::theme`] calls never touch the store.
pub struct ThemeController {
    store: Box<dyn PreferenceStore>,
    stored: Option<Theme>,
    default: ThemeDefault,
    system: Theme,
    session: Option<Theme>,
}

fn load_stored(store: &dyn PreferenceStore) -> Option<Theme> {
    let raw = store.get(THEME_KEY)?;
    match raw.parse() {
        Ok(theme) => Some(theme),
        Err(err) => {
            warn!(error = %err, "ignoring stored theme preference");
            None
        }
    }
}

impl ThemeController {
    pub fn new(store: Box<dyn PreferenceStore>, default: ThemeDefault, system: Theme) -> Self {
        let stored = load_stored(store.as_ref());
        Self {
            store,
            stored,
            default,
            system,
            session: None,
        }
    }

    /// Forces a theme for this session without touching the store.
    pub fn with_session_override(mut self, theme: Option<Theme>) -> Self {
        self.session = theme;
        self
    }

    /// The persisted theme, if a valid one is stored.
    pub fn stored(&self) -> Option<Theme> {
        self.stored
    }

    pub fn current(&self) -> Theme {
        self.session
            .or(self.stored)
            .unwrap_or_else(|| self.default.resolve(self.system))
    }

    /// Persists `theme`, reporting storage failures to the caller.
    pub fn set(&mut self, theme: Theme) -> Result<(), PreferenceError> {
        self.session = None;
        let result = self.store.set(THEME_KEY, theme.as_str());
        self.stored = load_stored(self.store.as_ref());
        result
    }

    /// Forgets the persisted theme so the default applies again.
    pub fn clear(&mut self) -> Result<(), PreferenceError> {
        self.session = None;
        let result = self.store.remove(THEME_KEY);
        self.stored = load_stored(self.store.as_ref());
        result
    }

    fn persist_or_degrade(&mut self, theme: Theme) {
        if let Err(err) = self.set(theme) {
            warn!(error = %err, "theme preference kept for this session only");
            let mut memory = MemoryPreferenceStore::default();
            memory.insert(THEME_KEY, theme.as_str());
            self.store = Box::new(memory);
            self.stored = Some(theme);
        }
    }
}

impl ThemeSource for ThemeController {
    fn theme(&self) -> Theme {
        self.current()
    }

    fn toggle(&mut self) -> Theme {
        let next = self.current().toggled();
        self.persist_or_degrade(next);
        debug!(theme = %next, "theme toggled");
        next
    }

    fn system_theme_changed(&mut self, system: Theme) {
        if self.system != system {
            debug!(theme = %system, "desktop colour scheme changed");
            self.system = system;
        }
    }
}
