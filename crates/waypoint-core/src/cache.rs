use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::paths;

/// Change-detection hash over the api url.
///
/// Computed byte-wise as `h = h * 131 + byte (mod 2^32)` and rendered in
/// decimal. Urls are ASCII after validation, so the byte-wise form matches
/// hashes produced by code points.
pub fn simple_hash(s: &str) -> String {
    let mut h: u32 = 0;
    for b in s.bytes() {
        h = h.wrapping_mul(131).wrapping_add(b as u32);
    }
    h.to_string()
}

/// Durable store for the last resolved api url and its hash.
///
/// Implementations must keep url and hash as a pair; a url stored without
/// its matching hash would defeat change detection.
pub trait ConfigCache: Send + Sync {
    fn cached_api(&self) -> Option<String>;

    fn cached_hash(&self) -> Option<String>;

    fn save_api(&self, api: &str) -> Result<(), ConfigError>;

    /// True when `api` differs from the cached entry (or nothing is cached).
    fn is_different(&self, api: &str) -> bool {
        self.cached_hash().as_deref() != Some(simple_hash(api).as_str())
    }
}

/// In-memory cache for tests and embedders with their own persistence.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entry: Mutex<Option<(String, String)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api(api: &str) -> Self {
        Self {
            entry: Mutex::new(Some((api.to_string(), simple_hash(api)))),
        }
    }
}

impl ConfigCache for MemoryCache {
    fn cached_api(&self) -> Option<String> {
        self.entry
            .lock()
            .as_ref()
            .map(|(api, _)| api.clone())
            .filter(|api| !api.is_empty())
    }

    fn cached_hash(&self) -> Option<String> {
        self.entry
            .lock()
            .as_ref()
            .map(|(_, hash)| hash.clone())
            .filter(|hash| !hash.is_empty())
    }

    fn save_api(&self, api: &str) -> Result<(), ConfigError> {
        *self.entry.lock() = Some((api.to_string(), simple_hash(api)));
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    #[serde(rename = "remote.api.url")]
    api_url: Option<String>,
    #[serde(rename = "remote.api.hash")]
    api_hash: Option<String>,
}

/// File-backed cache under the per-user data directory.
///
/// A corrupt or unreadable file degrades to an empty cache rather than
/// failing the bootstrap.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    /// Cache at the default per-user location.
    pub fn open_default() -> Result<Self, ConfigError> {
        Ok(Self {
            path: paths::cache_file_path()?,
        })
    }

    /// Cache backed by an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> CacheFile {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return CacheFile::default(),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "failed to read api cache");
                return CacheFile::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(file) => file,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "api cache is corrupt, ignoring");
                CacheFile::default()
            }
        }
    }

    fn write(&self, file: &CacheFile) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Cache(format!("create {}: {e}", parent.display())))?;
        }
        let raw = serde_json::to_vec_pretty(file).map_err(|e| ConfigError::Cache(e.to_string()))?;
        // Write-then-rename so readers never observe a half-written entry.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)
            .map_err(|e| ConfigError::Cache(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| ConfigError::Cache(format!("rename {}: {e}", self.path.display())))?;
        Ok(())
    }
}

impl ConfigCache for FileCache {
    fn cached_api(&self) -> Option<String> {
        self.read().api_url.filter(|url| !url.is_empty())
    }

    fn cached_hash(&self) -> Option<String> {
        self.read().api_hash.filter(|hash| !hash.is_empty())
    }

    fn save_api(&self, api: &str) -> Result<(), ConfigError> {
        self.write(&CacheFile {
            api_url: Some(api.to_string()),
            api_hash: Some(simple_hash(api)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_known_values() {
        assert_eq!(simple_hash(""), "0");
        assert_eq!(simple_hash("a"), "97");
        assert_eq!(simple_hash("ab"), "12805");
    }

    #[test]
    fn hash_is_deterministic_and_wraps() {
        let url = "https://api.example.com/v2/with/a/fairly/long/path";
        assert_eq!(simple_hash(url), simple_hash(url));
        assert_ne!(simple_hash(url), simple_hash("https://api.example.com"));
        // Long input exercises the mod 2^32 wrap without panicking.
        let long = "x".repeat(4096);
        let _ = simple_hash(&long);
    }

    #[test]
    fn memory_cache_detects_change() {
        let cache = MemoryCache::new();
        assert!(cache.cached_api().is_none());
        assert!(cache.is_different("https://api.example.com"));

        cache.save_api("https://api.example.com").unwrap();
        assert_eq!(cache.cached_api().as_deref(), Some("https://api.example.com"));
        assert!(!cache.is_different("https://api.example.com"));
        assert!(cache.is_different("https://api.elsewhere.com"));
    }

    #[test]
    fn memory_cache_treats_empty_url_as_absent() {
        let cache = MemoryCache::with_api("");
        assert!(cache.cached_api().is_none());
        assert!(cache.is_different("https://api.example.com"));

        let cache = MemoryCache::new();
        cache.save_api("").unwrap();
        assert!(cache.cached_api().is_none());
    }

    #[test]
    fn file_cache_round_trips_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remote-api.json");

        let cache = FileCache::at(&path);
        assert!(cache.cached_api().is_none());
        cache.save_api("https://api.example.com").unwrap();

        let reopened = FileCache::at(&path);
        assert_eq!(
            reopened.cached_api().as_deref(),
            Some("https://api.example.com")
        );
        assert_eq!(
            reopened.cached_hash(),
            Some(simple_hash("https://api.example.com"))
        );
        assert!(!reopened.is_different("https://api.example.com"));
    }

    #[test]
    fn file_cache_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("cache.json");
        let cache = FileCache::at(&path);
        cache.save_api("https://api.example.com").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remote-api.json");
        fs::write(&path, "{{{ not json").unwrap();

        let cache = FileCache::at(&path);
        assert!(cache.cached_api().is_none());
        assert!(cache.is_different("https://api.example.com"));

        // Still writable after corruption.
        cache.save_api("https://api.example.com").unwrap();
        assert_eq!(
            cache.cached_api().as_deref(),
            Some("https://api.example.com")
        );
    }

    #[test]
    fn empty_stored_url_counts_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remote-api.json");
        fs::write(
            &path,
            r#"{"remote.api.url":"","remote.api.hash":""}"#,
        )
        .unwrap();
        let cache = FileCache::at(&path);
        assert!(cache.cached_api().is_none());
        assert!(cache.cached_hash().is_none());
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remote-api.json");
        let cache = FileCache::at(&path);
        cache.save_api("https://api.example.com").unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("remote-api.json")]);
    }
}
