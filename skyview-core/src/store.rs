//! Persisted client-side preferences: a small string key-value store.
//!
//! Values are JSON documents. Two keys are used: [`HISTORY_KEY`] holds the
//! recent-search list and [`THEME_KEY`] the theme.

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::{
    collections::BTreeMap,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::{history::RecentSearches, theme::Theme};

pub const HISTORY_KEY: &str = "searchHistory";
pub const THEME_KEY: &str = "theme";

pub trait PreferenceStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Store backed by a single JSON object file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skyview", "skyview")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(dirs.data_dir().join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read preferences: {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse preferences: {}", self.path.display()))
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(entries).context("Failed to serialize preferences")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write preferences: {}", self.path.display()))
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }
}

/// In-process store; nothing survives the session.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("preference store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("preference store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Missing key means an empty list.
pub fn load_history(store: &dyn PreferenceStore) -> Result<RecentSearches> {
    match store.get(HISTORY_KEY)? {
        Some(json) => serde_json::from_str(&json).context("Failed to parse stored search history"),
        None => Ok(RecentSearches::new()),
    }
}

pub fn save_history(store: &dyn PreferenceStore, history: &RecentSearches) -> Result<()> {
    let json = serde_json::to_string(history).context("Failed to serialize search history")?;
    store.set(HISTORY_KEY, &json)
}

pub fn load_theme(store: &dyn PreferenceStore) -> Result<Option<Theme>> {
    store
        .get(THEME_KEY)?
        .map(|json| serde_json::from_str(&json).context("Failed to parse stored theme"))
        .transpose()
}

pub fn save_theme(store: &dyn PreferenceStore, theme: Theme) -> Result<()> {
    let json = serde_json::to_string(&theme).context("Failed to serialize theme")?;
    store.set(THEME_KEY, &json)
}
