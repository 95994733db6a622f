use crate::feed::{ErrorKind, FeedEntry, FetchError};
use crate::registry::FeedId;
use thiserror::Error;
use tokio::sync::oneshot;

/// Sequence number of a load request. The first request gets 1.
pub type Seq = u64;

/// Completion callback for a load request.
pub type OnDone = Box<dyn FnOnce(Result<(), LoadError>) + Send + 'static>;

/// Lifecycle of a single load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Fetch issued, result not yet processed.
    Pending,
    /// Entries available, about to render and commit.
    Fetched,
    /// Fragment installed and callback fired.
    Committed,
    /// A newer request was issued before this one resolved; callback dropped.
    Superseded,
    /// Fetch failed while current; callback fired with the error.
    Failed,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestState::Pending | RequestState::Fetched)
    }
}

/// A failed load, reported to the caller through its completion callback.
#[derive(Debug, Error)]
#[error("Failed to load feed {feed_id}: {source}")]
pub struct LoadError {
    pub feed_id: FeedId,
    #[source]
    pub source: FetchError,
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

pub(crate) struct LoadRequest {
    pub(crate) feed_id: FeedId,
    pub(crate) state: RequestState,
    pub(crate) on_done: OnDone,
}

/// Sent by a fetch task when its network call resolves.
pub(crate) struct LoadEvent {
    pub(crate) seq: Seq,
    pub(crate) feed_id: FeedId,
    pub(crate) result: Result<Vec<FeedEntry>, FetchError>,
}

/// How a request issued through [`LoadCoordinator::request`](crate::load::LoadCoordinator::request) ended.
#[derive(Debug)]
pub enum LoadStatus {
    Committed,
    Failed(LoadError),
    Superseded,
}

/// One-shot handle on the outcome of a load request.
///
/// The coordinator still has to be driven (`process_next`/`settle`) for the
/// ticket to resolve.
#[derive(Debug)]
pub struct LoadTicket {
    seq: Seq,
    feed_id: FeedId,
    rx: oneshot::Receiver<Result<(), LoadError>>,
}

impl LoadTicket {
    pub(crate) fn new(
        seq: Seq,
        feed_id: FeedId,
        rx: oneshot::Receiver<Result<(), LoadError>>,
    ) -> Self {
        Self { seq, feed_id, rx }
    }

    pub fn seq(&self) -> Seq {
        self.seq
    }

    pub fn feed_id(&self) -> FeedId {
        self.feed_id
    }

    /// Waits for the outcome. A dropped sender means the request was superseded.
    pub async fn wait(self) -> LoadStatus {
        match self.rx.await {
            Ok(Ok(())) => LoadStatus::Committed,
            Ok(Err(e)) => LoadStatus::Failed(e),
            Err(_) => LoadStatus::Superseded,
        }
    }
}
