//! feedpane: a feed reader core that shows one feed at a time.
//!
//! A fixed [`FeedRegistry`](registry::FeedRegistry) lists the available
//! feeds. The [`LoadCoordinator`](load::LoadCoordinator) fetches, renders and
//! commits one of them into the shared [`ContentSlot`](load::ContentSlot),
//! making sure overlapping requests resolve to the most recently requested
//! feed. The [`MenuController`](menu::MenuController) tracks the slide-out
//! menu that lists the feeds.

pub mod config;
pub mod feed;
pub mod load;
pub mod menu;
pub mod registry;
pub mod render;
pub mod util;

pub use config::{Config, ConfigError};
pub use feed::{FeedEntry, FeedFetcher, FetchError, HttpFetcher};
pub use load::{ContentSlot, LoadCoordinator, LoadError, LoadStatus, LoadTicket, RequestState};
pub use menu::{FeedMenu, MenuController};
pub use registry::{FeedDescriptor, FeedId, FeedRegistry, FeedSource, RegistryError};
pub use render::{FeedRenderer, Fragment};
