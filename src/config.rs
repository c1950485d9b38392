// Client configuration.
// Identity, cache settings and network options, fixed once a client is built.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{DEFAULT_CACHE_DIR, DEFAULT_TTL, platform_cache_dir};
use crate::error::{InstafeedError, Result};

/// Default API root. Paths are resolved beneath it.
pub const DEFAULT_API_BASE: &str = "https://api.instagram.com/v1/";

/// Default network timeout for a single fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const ENV_USERNAME: &str = "INSTAGRAM_USERNAME";
const ENV_ACCESS_TOKEN: &str = "INSTAGRAM_ACCESS_TOKEN";
const ENV_CACHE_TTL_SECS: &str = "INSTAGRAM_CACHE_TTL_SECS";
const ENV_CACHE_DIR: &str = "INSTAGRAM_CACHE_DIR";

/// Settings for an [`InstagramClient`](crate::InstagramClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Account the identity-based accessors act on.
    pub username: String,
    /// OAuth access token sent with every request.
    pub access_token: String,
    /// How long a cached response is served without refetching.
    pub cache_ttl: Duration,
    /// Where responses are cached. `None` disables caching.
    pub cache_dir: Option<PathBuf>,
    /// API root URL.
    pub api_base: String,
    /// Network timeout per fetch.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a config with default cache and network settings.
    pub fn new(username: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            access_token: access_token.into(),
            cache_ttl: DEFAULT_TTL,
            cache_dir: Some(PathBuf::from(DEFAULT_CACHE_DIR)),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load from `INSTAGRAM_*` environment variables.
    ///
    /// Unset variables fall back to defaults. An empty `INSTAGRAM_CACHE_DIR`
    /// disables caching.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(
            env::var(ENV_USERNAME).unwrap_or_default(),
            env::var(ENV_ACCESS_TOKEN).unwrap_or_default(),
        );

        if let Ok(secs) = env::var(ENV_CACHE_TTL_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                InstafeedError::InvalidConfig(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    ENV_CACHE_TTL_SECS, secs
                ))
            })?;
            config.cache_ttl = Duration::from_secs(secs);
        }

        if let Ok(dir) = env::var(ENV_CACHE_DIR) {
            config.cache_dir = (!dir.is_empty()).then(|| PathBuf::from(dir));
        }

        Ok(config)
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cache_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache_dir = None;
        self
    }

    /// Cache under the per-user platform cache directory, creating it if needed.
    ///
    /// Leaves the current setting untouched when the platform has no cache
    /// directory or it cannot be created.
    pub fn with_platform_cache_dir(mut self) -> Self {
        if let Some(dir) = platform_cache_dir() {
            match std::fs::create_dir_all(&dir) {
                Ok(()) => self.cache_dir = Some(dir),
                Err(e) => tracing::warn!(
                    dir = %dir.display(),
                    error = %e,
                    "Could not create platform cache directory"
                ),
            }
        }
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether neither a username nor a token was supplied.
    pub fn is_anonymous(&self) -> bool {
        self.username.is_empty() && self.access_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("jack", "token");

        assert_eq!(config.username, "jack");
        assert_eq!(config.access_token, "token");
        assert_eq!(config.cache_ttl, Duration::from_secs(600));
        assert_eq!(config.cache_dir, Some(PathBuf::from("./cache/")));
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(!config.is_anonymous());
    }

    #[test]
    fn test_builders() {
        let config = ClientConfig::new("jack", "token")
            .with_cache_ttl(Duration::from_secs(30))
            .with_cache_dir("/tmp/insta")
            .with_api_base("http://localhost:8080/v1/")
            .with_timeout(Duration::from_millis(250));

        assert_eq!(config.cache_ttl, Duration::from_secs(30));
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/insta")));
        assert_eq!(config.api_base, "http://localhost:8080/v1/");
        assert_eq!(config.timeout, Duration::from_millis(250));

        assert_eq!(config.without_cache().cache_dir, None);
    }

    #[test]
    fn test_anonymous() {
        assert!(ClientConfig::new("", "").is_anonymous());
        assert!(!ClientConfig::new("", "token").is_anonymous());
        assert!(!ClientConfig::new("jack", "").is_anonymous());
    }

    #[test]
    fn test_platform_cache_dir_is_crate_specific() {
        // Not every CI environment has a home directory.
        if let Some(dir) = platform_cache_dir() {
            assert!(dir.components().any(|part| part.as_os_str() == "instafeed"));
        }
    }

    /// Serializes tests that mutate the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_VARS: [&str; 4] = [ENV_USERNAME, ENV_ACCESS_TOKEN, ENV_CACHE_TTL_SECS, ENV_CACHE_DIR];

    /// Run `f` with exactly `vars` set among the `INSTAGRAM_*` variables.
    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        // SAFETY: every test touching these variables holds ENV_LOCK.
        unsafe {
            for name in ALL_VARS {
                env::remove_var(name);
            }
            for (name, value) in vars {
                env::set_var(name, value);
            }
        }

        let result = f();

        unsafe {
            for name in ALL_VARS {
                env::remove_var(name);
            }
        }
        result
    }

    #[test]
    fn test_from_env_reads_values() {
        let config = with_env(
            &[
                (ENV_USERNAME, "jack"),
                (ENV_ACCESS_TOKEN, "token"),
                (ENV_CACHE_TTL_SECS, " 90 "),
                (ENV_CACHE_DIR, "/tmp/insta"),
            ],
            ClientConfig::from_env,
        )
        .unwrap();

        assert_eq!(config.username, "jack");
        assert_eq!(config.access_token, "token");
        assert_eq!(config.cache_ttl, Duration::from_secs(90));
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/insta")));
    }

    #[test]
    fn test_from_env_defaults_when_unset() {
        let config = with_env(&[], ClientConfig::from_env).unwrap();

        assert!(config.is_anonymous());
        assert_eq!(config.cache_ttl, DEFAULT_TTL);
        assert_eq!(config.cache_dir, Some(PathBuf::from(DEFAULT_CACHE_DIR)));
    }

    #[test]
    fn test_from_env_empty_cache_dir_disables_cache() {
        let config = with_env(
            &[(ENV_USERNAME, "jack"), (ENV_CACHE_DIR, "")],
            ClientConfig::from_env,
        )
        .unwrap();

        assert_eq!(config.cache_dir, None);
    }

    #[test]
    fn test_from_env_rejects_bad_ttl() {
        let result = with_env(&[(ENV_CACHE_TTL_SECS, "ten")], ClientConfig::from_env);

        match result {
            Err(InstafeedError::InvalidConfig(msg)) => {
                assert!(msg.contains(ENV_CACHE_TTL_SECS));
                assert!(msg.contains("ten"));
            }
            other => panic!("expected invalid config, got {:?}", other),
        }
    }
}
