//! File-backed string key/value entries.
//!
//! Each key is stored as its own file under the store directory, so entries
//! are independent: a corrupt or missing entry never affects its neighbors.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

/// Persistent string key/value store, one file per key.
pub struct KvStore {
    dir: PathBuf,
}

impl KvStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create store directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Read the value for `key`, or `None` if the entry does not exist.
    pub fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let value = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read store entry: {}", key))?;
        Ok(Some(value))
    }

    /// Write `value` for `key`, overwriting any previous entry.
    pub fn save(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key);
        std::fs::write(&path, value)
            .with_context(|| format!("Failed to write store entry: {}", key))?;
        Ok(())
    }

    /// Remove the entry for `key`. Missing entries are a no-op.
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove store entry: {}", key))?;
            debug!(key, "Removed store entry");
        }
        Ok(())
    }
}
