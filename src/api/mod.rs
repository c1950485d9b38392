// Instagram API module.
// Provides the query dispatcher, typed accessors and response types.

pub mod client;
pub mod endpoints;
pub mod envelope;
pub mod transport;
pub mod types;

pub use client::InstagramClient;
pub use endpoints::DEFAULT_LIMIT;
pub use envelope::{Envelope, Meta};
pub use transport::{Fetched, HttpTransport, Transport};
pub use types::*;
