use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::{SessionStore, StoreError};

/// Session store backed by a small JSON file. Every mutation rewrites
/// the whole file; the value set is a handful of short strings.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileSessionStore {
    /// Opens the store, loading existing values when present. A file
    /// that fails to parse is treated as empty rather than fatal, which
    /// costs at most a re-login.
    pub fn open(path: PathBuf) -> Self {
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(values) => values,
                Err(error) => {
                    warn!(path = %path.display(), %error, "session file is unreadable; starting fresh");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location under the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("genre-atlas").join("session.json"))
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let rendered = serde_json::to_string_pretty(&self.values)
            .map_err(|error| StoreError::Decode(error.to_string()))?;
        std::fs::write(&self.path, rendered)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_owned(), value.to_owned());
        self.persist()
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.values.clear();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
