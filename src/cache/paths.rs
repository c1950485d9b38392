// Cache path utilities.
// Names cache entry files and locates the per-user platform cache directory.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// File extension carried by every cache entry.
pub const ENTRY_EXTENSION: &str = "tmp";

/// Prefix for in-flight writes; never matches the entry pattern.
pub const PARTIAL_PREFIX: &str = ".partial-";

/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "./cache/";

/// Get the platform cache directory (~/.cache/instafeed on Linux).
pub fn platform_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "instafeed").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the entry file for a fingerprint.
pub fn entry_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.{}", key, ENTRY_EXTENSION))
}

/// Whether a directory listing item is a cache entry this store manages.
pub fn is_entry_file(path: &Path) -> bool {
    let is_partial = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(PARTIAL_PREFIX));

    !is_partial && path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION)
}
