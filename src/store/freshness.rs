//! Cache freshness record.
//!
//! A successful warm-up is recorded as three independent string entries:
//! a timestamp, the cache-format version, and a presence flag. The record
//! is fresh only while all three are present, the version matches the
//! compiled-in version, and the timestamp is inside the validity window.
//! Bumping [`CACHE_VERSION`] invalidates every prior record, which is the
//! cache-busting mechanism for deploys.

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use super::kv::KvStore;

/// Current cache-format version. Bump to force a re-warm on deploy.
pub const CACHE_VERSION: &str = "v1.0";

/// Store entry holding the last warm-up time as stringified epoch millis.
const TIMESTAMP_KEY: &str = "crmd-cache-timestamp";

/// Store entry holding the cache-format version at the last warm-up.
const VERSION_KEY: &str = "crmd-assets-cache-version";

/// Store entry holding the literal flag `"true"` once assets are warmed.
const CACHE_KEY: &str = "crmd-assets-cache";

/// Validity window for a warm-up record: 24 hours, in milliseconds.
const CACHE_DURATION_MS: i64 = 24 * 60 * 60 * 1000;

/// Read-only snapshot of the freshness record for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct FreshnessStatus {
    pub is_fresh: bool,
    pub timestamp: Option<String>,
    pub version: Option<String>,
    pub cached: Option<String>,
}

impl FreshnessStatus {
    /// Human-readable age of the record, e.g. "5m ago" or "never".
    pub fn age_display(&self) -> String {
        let Some(millis) = self.timestamp.as_deref().and_then(|t| t.parse::<i64>().ok()) else {
            return "never".to_string();
        };

        let minutes = (Utc::now().timestamp_millis() - millis) / 60_000;
        if minutes < 1 {
            // Also covers clock skew (negative age)
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// Tracks whether a prior warm-up is still valid.
pub struct FreshnessStore {
    kv: KvStore,
    version: String,
}

impl FreshnessStore {
    pub fn new(kv: KvStore) -> Self {
        Self {
            kv,
            version: CACHE_VERSION.to_string(),
        }
    }

    /// Override the compiled-in version string. Used to exercise the
    /// deploy-time cache-busting path.
    #[cfg(test)]
    fn with_version(kv: KvStore, version: &str) -> Self {
        Self {
            kv,
            version: version.to_string(),
        }
    }

    /// Read an entry, degrading storage errors to "absent".
    fn read_entry(&self, key: &str) -> Option<String> {
        match self.kv.load(key) {
            Ok(value) => value,
            Err(e) => {
                debug!(key, error = %e, "Failed to read freshness entry");
                None
            }
        }
    }

    /// Whether the record is present, version-compatible, and inside the
    /// validity window. Fails closed: any missing, unparsable, or unreadable
    /// entry reads as not fresh.
    pub fn is_fresh(&self) -> bool {
        let timestamp = self.read_entry(TIMESTAMP_KEY);
        let version = self.read_entry(VERSION_KEY);
        let flag = self.read_entry(CACHE_KEY);

        let (Some(timestamp), Some(version), Some(_flag)) = (timestamp, version, flag) else {
            return false;
        };

        if version != self.version {
            return false;
        }

        let millis = match timestamp.parse::<i64>() {
            Ok(m) => m,
            Err(_) => {
                debug!(timestamp, "Unparsable freshness timestamp");
                return false;
            }
        };

        let age = Utc::now().timestamp_millis() - millis;
        age < CACHE_DURATION_MS
    }

    /// Record a completed warm-up, overwriting any previous record.
    /// Safe to call redundantly.
    pub fn mark_cached(&self) -> Result<()> {
        self.kv
            .save(TIMESTAMP_KEY, &Utc::now().timestamp_millis().to_string())?;
        self.kv.save(VERSION_KEY, &self.version)?;
        self.kv.save(CACHE_KEY, "true")?;
        debug!(version = %self.version, "Marked assets cached");
        Ok(())
    }

    /// Remove the record. Missing entries are a no-op.
    pub fn clear(&self) -> Result<()> {
        self.kv.remove(TIMESTAMP_KEY)?;
        self.kv.remove(VERSION_KEY)?;
        self.kv.remove(CACHE_KEY)?;
        Ok(())
    }

    /// Diagnostic snapshot of the raw entries plus the freshness verdict.
    pub fn status(&self) -> FreshnessStatus {
        FreshnessStatus {
            is_fresh: self.is_fresh(),
            timestamp: self.read_entry(TIMESTAMP_KEY),
            version: self.read_entry(VERSION_KEY),
            cached: self.read_entry(CACHE_KEY),
        }
    }

    #[cfg(test)]
    fn backdate(&self, millis_ago: i64) {
        let then = Utc::now().timestamp_millis() - millis_ago;
        self.kv.save(TIMESTAMP_KEY, &then.to_string()).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FreshnessStore {
        FreshnessStore::new(KvStore::new(dir.path().to_path_buf()).unwrap())
    }

    #[test]
    fn test_not_fresh_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!store_in(&dir).is_fresh());
    }

    #[test]
    fn test_fresh_after_mark() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.mark_cached().unwrap();
        assert!(store.is_fresh());

        // Redundant marks are fine
        store.mark_cached().unwrap();
        assert!(store.is_fresh());
    }

    #[test]
    fn test_not_fresh_after_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.mark_cached().unwrap();
        store.clear().unwrap();
        assert!(!store.is_fresh());

        // Clearing again is a no-op, not an error
        store.clear().unwrap();
    }

    #[test]
    fn test_version_bump_invalidates() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir).mark_cached().unwrap();

        let bumped =
            FreshnessStore::with_version(KvStore::new(dir.path().to_path_buf()).unwrap(), "v2.0");
        assert!(!bumped.is_fresh());
    }

    #[test]
    fn test_expires_after_window() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.mark_cached().unwrap();

        store.backdate(CACHE_DURATION_MS - 60_000);
        assert!(store.is_fresh());

        store.backdate(CACHE_DURATION_MS + 1);
        assert!(!store.is_fresh());
    }

    #[test]
    fn test_corrupt_timestamp_reads_not_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.mark_cached().unwrap();

        let kv = KvStore::new(dir.path().to_path_buf()).unwrap();
        kv.save("crmd-cache-timestamp", "not-a-number").unwrap();
        assert!(!store.is_fresh());
    }

    #[test]
    fn test_status_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let status = store.status();
        assert!(!status.is_fresh);
        assert_eq!(status.timestamp, None);
        assert_eq!(status.age_display(), "never");

        store.mark_cached().unwrap();
        let status = store.status();
        assert!(status.is_fresh);
        assert_eq!(status.version.as_deref(), Some(CACHE_VERSION));
        assert_eq!(status.cached.as_deref(), Some("true"));
        assert_eq!(status.age_display(), "just now");
    }
}
