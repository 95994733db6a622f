//! Feed retrieval and parsing.
//!
//! - [`parser`] - RSS/Atom/JSON Feed parsing into [`FeedEntry`] values using `feed-rs`
//! - [`fetcher`] - the [`FeedFetcher`] seam and its HTTP implementation
//!
//! # Example
//!
//! ```ignore
//! use feedpane::feed::{FeedFetcher, HttpFetcher};
//!
//! let fetcher = HttpFetcher::new(HttpFetcher::build_client()?);
//! let entries = fetcher.fetch("https://example.com/feed.xml").await?;
//! ```

mod fetcher;
mod parser;

pub use fetcher::{
    ErrorKind, FeedFetcher, FetchError, HttpFetcher, DEFAULT_MAX_FEED_SIZE, DEFAULT_TIMEOUT,
};
pub use parser::{parse_feed, FeedEntry};
