// Cache store for raw API response bodies.
// Handles fingerprinting, TTL age lookup, atomic writes and purging.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use sha2::{Digest, Sha256};
use tempfile::Builder;
use tracing::{debug, warn};

use crate::error::{InstafeedError, Result};

use super::paths::{PARTIAL_PREFIX, entry_path, is_entry_file};

/// Default TTL for cached responses: 10 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// A cached response body together with its age.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedBody {
    /// Raw response bytes exactly as received.
    pub bytes: Vec<u8>,
    /// Time since the entry was last written.
    pub age: Duration,
}

impl CachedBody {
    /// Whether the entry is younger than the given TTL.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age < ttl
    }
}

/// Filesystem-backed store of response bodies keyed by request fingerprint.
///
/// Whether the store is usable is decided once, in [`CacheStore::open`]. A
/// disabled store reports every key as missing, drops writes and refuses to
/// purge.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: Option<PathBuf>,
}

impl CacheStore {
    /// Open a store over `dir`, disabling it if the directory is absent or not writable.
    pub fn open(dir: Option<&Path>) -> Self {
        let dir = match dir {
            None => None,
            Some(dir) if dir.as_os_str().is_empty() => None,
            Some(dir) => match check_writable(dir) {
                Ok(()) => Some(dir.to_path_buf()),
                Err(e) => {
                    warn!(
                        dir = %dir.display(),
                        error = %e,
                        "Cache path does not exist or is not writable, caching disabled"
                    );
                    None
                }
            },
        };

        Self { dir }
    }

    /// A store with caching switched off.
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    /// The directory entries live in, if caching is enabled.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Hex SHA-256 of the exact outbound URL.
    pub fn fingerprint(url: &str) -> String {
        hex::encode(Sha256::digest(url.as_bytes()))
    }

    /// Read an entry and its age. Missing entries and read errors are `None`.
    pub fn read(&self, key: &str) -> Option<CachedBody> {
        let path = entry_path(self.dir.as_deref()?, key);

        match read_entry(&path) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %short(key), error = %e, "Failed to read cache entry");
                None
            }
        }
    }

    /// Replace an entry atomically. Failures are logged, never returned.
    pub fn write(&self, key: &str, bytes: &[u8]) {
        let Some(dir) = self.dir.as_deref() else {
            return;
        };

        match write_entry(dir, key, bytes) {
            Ok(()) => debug!(key = %short(key), len = bytes.len(), "Cached response"),
            Err(e) => warn!(key = %short(key), error = %e, "Failed to write cache entry"),
        }
    }

    /// Delete every entry in the store and return how many were removed.
    pub fn purge_all(&self) -> Result<usize> {
        let dir = self.dir.as_deref().ok_or(InstafeedError::CacheDisabled)?;

        let mut removed = 0;
        for item in fs::read_dir(dir)? {
            let path = item?.path();
            if !is_entry_file(&path) {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                // Another client purged it first.
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        debug!(dir = %dir.display(), removed, "Purged cache");
        Ok(removed)
    }
}

/// Check that `dir` is an existing directory we can create files in.
fn check_writable(dir: &Path) -> io::Result<()> {
    if !fs::metadata(dir)?.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotADirectory,
            "cache path is not a directory",
        ));
    }

    Builder::new().prefix(PARTIAL_PREFIX).tempfile_in(dir)?;
    Ok(())
}

fn read_entry(path: &Path) -> io::Result<Option<CachedBody>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let modified = fs::metadata(path)?.modified()?;
    // A timestamp in the future counts as just written.
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO);

    Ok(Some(CachedBody { bytes, age }))
}

fn write_entry(dir: &Path, key: &str, bytes: &[u8]) -> io::Result<()> {
    // Write atomically via a uniquely named temp file
    let mut file = Builder::new()
        .prefix(PARTIAL_PREFIX)
        .suffix(".part")
        .tempfile_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(entry_path(dir, key)).map_err(|e| e.error)?;

    Ok(())
}

/// Shortened fingerprint for log lines.
pub(crate) fn short(key: &str) -> &str {
    &key[..8.min(key.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn open_temp() -> (CacheStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::open(Some(temp_dir.path()));
        (store, temp_dir)
    }

    fn backdate(path: &Path, by: Duration) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - by).unwrap();
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let url = "https://api.instagram.com/v1/users/search?access_token=t&q=bob";
        assert_eq!(CacheStore::fingerprint(url), CacheStore::fingerprint(url));
        assert_eq!(CacheStore::fingerprint(url).len(), 64);
    }

    #[test]
    fn test_fingerprint_differs_per_url() {
        let a = CacheStore::fingerprint("https://api.instagram.com/v1/tags/a?access_token=t");
        let b = CacheStore::fingerprint("https://api.instagram.com/v1/tags/b?access_token=t");
        let c = CacheStore::fingerprint("https://api.instagram.com/v1/tags/a?access_token=u");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_write_and_read() {
        let (store, temp_dir) = open_temp();
        assert!(store.is_enabled());

        store.write("abc", b"{\"meta\":{\"code\":200}}");

        let cached = store.read("abc").unwrap();
        assert_eq!(cached.bytes, b"{\"meta\":{\"code\":200}}");
        assert!(cached.age < Duration::from_secs(5));
        assert!(temp_dir.path().join("abc.tmp").exists());
    }

    #[test]
    fn test_write_overwrites() {
        let (store, _temp_dir) = open_temp();

        store.write("abc", b"first");
        store.write("abc", b"second");

        assert_eq!(store.read("abc").unwrap().bytes, b"second");
    }

    #[test]
    fn test_write_leaves_no_partial_files() {
        let (store, temp_dir) = open_temp();

        store.write("abc", b"body");

        let names: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["abc.tmp".to_string()]);
    }

    #[test]
    fn test_read_nonexistent() {
        let (store, _temp_dir) = open_temp();
        assert!(store.read("missing").is_none());
    }

    #[test]
    fn test_age_tracks_modification_time() {
        let (store, temp_dir) = open_temp();
        store.write("abc", b"body");

        backdate(&temp_dir.path().join("abc.tmp"), Duration::from_secs(120));

        let cached = store.read("abc").unwrap();
        assert!(cached.age >= Duration::from_secs(120));
        assert!(!cached.is_fresh(Duration::from_secs(60)));
        assert!(cached.is_fresh(Duration::from_secs(600)));
    }

    #[test]
    fn test_zero_ttl_is_never_fresh() {
        let cached = CachedBody {
            bytes: Vec::new(),
            age: Duration::ZERO,
        };
        assert!(!cached.is_fresh(Duration::ZERO));
    }

    #[test]
    fn test_purge_all_removes_only_entries() {
        let (store, temp_dir) = open_temp();
        store.write("one", b"1");
        store.write("two", b"2");
        fs::write(temp_dir.path().join("keep.json"), "{}").unwrap();

        assert_eq!(store.purge_all().unwrap(), 2);
        assert!(store.read("one").is_none());
        assert!(store.read("two").is_none());
        assert!(temp_dir.path().join("keep.json").exists());
    }

    #[test]
    fn test_missing_dir_disables_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::open(Some(&temp_dir.path().join("nope")));

        assert!(!store.is_enabled());
        store.write("abc", b"body");
        assert!(store.read("abc").is_none());
        assert!(matches!(
            store.purge_all(),
            Err(InstafeedError::CacheDisabled)
        ));
    }

    #[test]
    fn test_file_path_disables_store() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("plain-file");
        fs::write(&file, "x").unwrap();

        assert!(!CacheStore::open(Some(&file)).is_enabled());
    }

    #[test]
    fn test_empty_or_absent_dir_disables_store() {
        assert!(!CacheStore::open(None).is_enabled());
        assert!(!CacheStore::open(Some(Path::new(""))).is_enabled());
        assert!(!CacheStore::disabled().is_enabled());
    }

    #[test]
    fn test_writable_check_leaves_nothing_behind() {
        let temp_dir = TempDir::new().unwrap();
        let _store = CacheStore::open(Some(temp_dir.path()));

        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
