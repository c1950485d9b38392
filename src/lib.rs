//! Instagram REST API client with a filesystem response cache.
//!
//! Every accessor funnels through [`InstagramClient::execute`], which serves
//! fresh cached replies without touching the network, refetches stale ones,
//! and falls back to the stale copy when a fetch fails.
//!
//! ```no_run
//! use instafeed::{ClientConfig, InstagramClient};
//!
//! # async fn run() -> instafeed::Result<()> {
//! let client = InstagramClient::new(ClientConfig::new("jack", "ACCESS_TOKEN"))?;
//! for media in client.tag_media("sunset", 10).await? {
//!     println!("{} {}", media.id, media.created_time);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;

pub use api::{InstagramClient, Transport};
pub use cache::CacheStore;
pub use config::ClientConfig;
pub use error::{InstafeedError, Result};
