// Network transport for API requests.
// The only code that touches the network; swapped for fakes in tests.

use async_trait::async_trait;
use reqwest::{
    Client, StatusCode, Url,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use std::time::Duration;

use crate::error::{InstafeedError, Result};

/// A delivered reply: HTTP status plus raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl Fetched {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
        }
    }

    /// Only successful replies may replace a cache entry.
    pub fn is_cacheable(&self) -> bool {
        self.status.is_success() && !self.body.is_empty()
    }
}

/// Performs a GET and returns the reply.
///
/// Any `Err` is a fetch failure: the dispatcher may fall back to a stale
/// cache entry for it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<Fetched>;
}

/// reqwest-backed transport with a per-request timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("instafeed/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(InstafeedError::Http)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<Fetched> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        check_status(status)?;

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(InstafeedError::EmptyBody);
        }

        Ok(Fetched {
            status,
            body: body.to_vec(),
        })
    }
}

/// The API reports client errors inside the envelope of a 4xx reply, so only
/// server-side failures count as fetch failures. 4xx replies are delivered
/// but never cached.
fn check_status(status: StatusCode) -> Result<()> {
    if status.is_server_error() || status.is_informational() || status.is_redirection() {
        Err(InstafeedError::Status(status.as_u16()))
    } else {
        Ok(())
    }
}
