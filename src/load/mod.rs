//! Request lifecycle for the content area.
//!
//! - [`coordinator`] - [`LoadCoordinator`], the fetch → render → commit state machine
//! - [`request`] - request states, completion callbacks, errors and tickets
//! - [`slot`] - [`ContentSlot`], the single rendering target
//!
//! # Example
//!
//! ```ignore
//! use feedpane::load::LoadCoordinator;
//!
//! let mut coordinator = LoadCoordinator::new(registry, fetcher, renderer);
//! coordinator.load(0, |result| println!("first feed done: {:?}", result.is_ok()))?;
//! coordinator.load(1, |result| println!("second feed done: {:?}", result.is_ok()))?;
//! coordinator.settle().await; // only the second callback fires
//! ```

mod coordinator;
mod request;
mod slot;

pub use coordinator::LoadCoordinator;
pub use request::{LoadError, LoadStatus, LoadTicket, OnDone, RequestState, Seq};
pub use slot::{Commit, ContentSlot, SlotItem};
