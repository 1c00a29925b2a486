use std::{collections::HashMap, path::PathBuf, sync::Mutex};

use async_trait::async_trait;
use tokio::fs;

use crate::error::{AppError, AppResult};

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Durable string storage that outlives one session.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> AppResult<()>;
}

/// JSON object on disk. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_all(&self) -> AppResult<HashMap<String, String>> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(AppError::Storage(err)),
        }
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value.to_string());
        let bytes = serde_json::to_vec_pretty(&entries)?;
        fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("memory store poisoned")))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("memory store poisoned")))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stored choice wins; otherwise follow the OS dark-mode signal.
pub async fn load_theme(store: &dyn KeyValueStore, prefers_dark: bool) -> AppResult<Theme> {
    let theme = match store.get(THEME_KEY).await?.as_deref() {
        Some("dark") => Theme::Dark,
        Some(_) => Theme::Light,
        None if prefers_dark => Theme::Dark,
        None => Theme::Light,
    };
    Ok(theme)
}

pub async fn toggle_theme(store: &dyn KeyValueStore, current: Theme) -> AppResult<Theme> {
    let next = current.toggled();
    store.set(THEME_KEY, next.as_str()).await?;
    tracing::debug!(theme = next.as_str(), "theme toggled");
    Ok(next)
}
