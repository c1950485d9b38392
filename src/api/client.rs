// Instagram API client.
// Every request goes through `execute`, which owns caching, fetching and envelope checks.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::cache::store::short;
use crate::config::ClientConfig;
use crate::error::{InstafeedError, Result};

use super::envelope;
use super::transport::{HttpTransport, Transport};

/// Query parameter that carries the OAuth token.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Instagram API client with a filesystem response cache.
pub struct InstagramClient {
    config: ClientConfig,
    cache: CacheStore,
    transport: Arc<dyn Transport>,
    user_id: RwLock<Option<String>>,
}

impl InstagramClient {
    /// Create a client that talks to the API over HTTP.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client from `INSTAGRAM_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Create a client over a custom transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        if config.is_anonymous() {
            warn!("Neither username nor access token supplied, API calls will be rejected");
        }

        let cache = CacheStore::open(config.cache_dir.as_deref());

        Self {
            config,
            cache,
            transport,
            user_id: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Build the full request URL for the path `segments` and `params`.
    ///
    /// Each segment is percent-encoded as a single path segment, so a `/`
    /// inside an id or tag cannot reach another endpoint. Empty, `.` and
    /// `..` segments are rejected.
    ///
    /// Parameters are sorted by key so the same logical request always maps
    /// to the same URL, and therefore the same cache entry. The access token
    /// always replaces any caller-supplied `access_token`.
    pub fn request_url<I, K, V>(&self, segments: &[&str], params: I) -> Result<Url>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        if let Some(bad) = segments
            .iter()
            .find(|segment| matches!(**segment, "" | "." | ".."))
        {
            return Err(InstafeedError::InvalidSegment(bad.to_string()));
        }

        let mut query: BTreeMap<String, String> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        query.insert(
            ACCESS_TOKEN_PARAM.to_string(),
            self.config.access_token.clone(),
        );

        let mut url = Url::parse(&self.config.api_base)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().extend_pairs(&query);

        Ok(url)
    }

    /// Run a query against the path `segments` and return the reply's `data` payload.
    ///
    /// Fresh cache entries are served without touching the network. On a
    /// fetch failure a stale entry, if any, is used instead; it is validated
    /// like any other reply. Only 2xx replies replace a cache entry.
    pub async fn execute<I, K, V>(&self, segments: &[&str], params: I) -> Result<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let url = self.request_url(segments, params)?;
        let path = url.path();
        let key = CacheStore::fingerprint(url.as_str());
        let cached = self.cache.read(&key);

        let body = match cached {
            Some(entry) if entry.is_fresh(self.config.cache_ttl) => {
                debug!(path, key = %short(&key), age = ?entry.age, "Cache hit");
                Some(entry.bytes)
            }
            stale => {
                debug!(path, key = %short(&key), stale = stale.is_some(), "Fetching");
                match self.transport.get(&url).await {
                    Ok(fetched) if !fetched.body.is_empty() => {
                        if fetched.is_cacheable() {
                            self.cache.write(&key, &fetched.body);
                        } else {
                            debug!(path, status = %fetched.status, "Not caching error reply");
                        }
                        Some(fetched.body)
                    }
                    fetched => {
                        let reason = match fetched {
                            Err(e) => e.to_string(),
                            Ok(_) => "empty response body".to_string(),
                        };
                        match stale {
                            Some(entry) => {
                                warn!(path, error = %reason, age = ?entry.age, "Fetch failed, using stale cache");
                                Some(entry.bytes)
                            }
                            None => {
                                warn!(path, error = %reason, "Fetch failed with nothing cached");
                                None
                            }
                        }
                    }
                }
            }
        };

        envelope::validate(body.as_deref()).inspect_err(|e| {
            if e.is_protocol() {
                warn!(path, error = %e, "API returned an error");
            }
        })
    }

    /// Remove every cached response. Fails if caching is disabled.
    pub fn purge_caches(&self) -> Result<usize> {
        self.cache.purge_all()
    }

    /// Forget the memoized user id so the next lookup hits the API again.
    pub fn invalidate_user_id(&self) {
        *self.user_id.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub(crate) fn cached_user_id(&self) -> Option<String> {
        self.user_id
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(crate) fn remember_user_id(&self, id: &str) {
        *self.user_id.write().unwrap_or_else(|e| e.into_inner()) = Some(id.to_string());
    }
}
