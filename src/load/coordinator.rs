use crate::feed::{FeedFetcher, FetchError};
use crate::load::request::{
    LoadError, LoadEvent, LoadRequest, LoadTicket, OnDone, RequestState, Seq,
};
use crate::load::slot::ContentSlot;
use crate::registry::{FeedId, FeedRegistry, RegistryError};
use crate::render::FeedRenderer;
use futures::FutureExt;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Number of resolved requests whose final state stays queryable.
const HISTORY_LEN: usize = 64;

/// Drives the fetch → render → commit cycle for the content area.
///
/// Every call to [`load`](Self::load) gets the next sequence number and
/// becomes the current request. Fetches run as Tokio tasks and report back
/// over a channel; their results are applied only by
/// [`process_next`](Self::process_next) / [`settle`](Self::settle), on the
/// task that owns the coordinator. When a result is applied it commits only
/// if its sequence number is still the current one, so the content area
/// always converges to the last requested feed whatever order the network
/// answers in. Superseded requests never invoke their callback.
pub struct LoadCoordinator {
    registry: Arc<FeedRegistry>,
    fetcher: Arc<dyn FeedFetcher>,
    renderer: FeedRenderer,
    slot: ContentSlot,
    current_seq: Seq,
    requests: HashMap<Seq, LoadRequest>,
    history: LruCache<Seq, RequestState>,
    event_tx: mpsc::UnboundedSender<LoadEvent>,
    event_rx: mpsc::UnboundedReceiver<LoadEvent>,
}

impl LoadCoordinator {
    pub fn new(
        registry: Arc<FeedRegistry>,
        fetcher: Arc<dyn FeedFetcher>,
        renderer: FeedRenderer,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            registry,
            fetcher,
            renderer,
            slot: ContentSlot::default(),
            current_seq: 0,
            requests: HashMap::new(),
            history: LruCache::new(NonZeroUsize::new(HISTORY_LEN).unwrap_or(NonZeroUsize::MIN)),
            event_tx,
            event_rx,
        }
    }

    /// Starts loading `feed_id` into the content area.
    ///
    /// `on_done` is called exactly once with `Ok(())` after the fragment is
    /// committed, or with the error if the fetch fails, unless another `load`
    /// is issued before this one resolves. In that case it is dropped without
    /// being called.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::OutOfRange`] for an unknown feed id. Nothing
    /// is started, the current request is unaffected and `on_done` is dropped.
    pub fn load<F>(&mut self, feed_id: FeedId, on_done: F) -> Result<Seq, RegistryError>
    where
        F: FnOnce(Result<(), LoadError>) + Send + 'static,
    {
        let url = self.registry.get(feed_id)?.url.clone();

        self.current_seq += 1;
        let seq = self.current_seq;

        if !self.requests.is_empty() {
            tracing::debug!(
                seq,
                feed_id,
                superseded = self.requests.len(),
                "New load supersedes in-flight requests"
            );
        }

        let on_done: OnDone = Box::new(on_done);
        self.requests.insert(
            seq,
            LoadRequest {
                feed_id,
                state: RequestState::Pending,
                on_done,
            },
        );

        tracing::debug!(seq, feed_id, url = %url, "Starting feed load");
        self.spawn_fetch(seq, feed_id, url);
        Ok(seq)
    }

    /// Same as [`load`](Self::load) but reports through a [`LoadTicket`].
    pub fn request(&mut self, feed_id: FeedId) -> Result<LoadTicket, RegistryError> {
        let (tx, rx) = oneshot::channel();
        let seq = self.load(feed_id, move |result| {
            let _ = tx.send(result);
        })?;
        Ok(LoadTicket::new(seq, feed_id, rx))
    }

    /// Waits for the next fetch to resolve and applies it.
    ///
    /// Returns the sequence number and final state of the resolved request,
    /// or `None` when nothing is in flight.
    pub async fn process_next(&mut self) -> Option<(Seq, RequestState)> {
        while !self.requests.is_empty() {
            // We hold a sender, so the channel cannot close under us
            let event = self.event_rx.recv().await?;
            if let Some(resolved) = self.apply(event) {
                return Some(resolved);
            }
        }
        None
    }

    /// Processes events until every issued request has resolved.
    pub async fn settle(&mut self) {
        while self.process_next().await.is_some() {}
    }

    pub fn slot(&self) -> &ContentSlot {
        &self.slot
    }

    /// Sequence number of the most recent `load`, 0 if none.
    pub fn current_seq(&self) -> Seq {
        self.current_seq
    }

    /// Number of requests whose fetch has not been processed yet.
    pub fn in_flight(&self) -> usize {
        self.requests.len()
    }

    /// State of a request, if it is in flight or resolved recently.
    pub fn state(&self, seq: Seq) -> Option<RequestState> {
        self.requests
            .get(&seq)
            .map(|r| r.state)
            .or_else(|| self.history.peek(&seq).copied())
    }

    fn spawn_fetch(&self, seq: Seq, feed_id: FeedId, url: String) {
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let result = match AssertUnwindSafe(fetcher.fetch(&url)).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => {
                    let msg = panic_message(panic.as_ref());
                    tracing::error!(task = "feed_fetch", seq, url = %url, error = %msg, "Fetch task panicked");
                    Err(FetchError::Aborted(msg))
                }
            };

            if tx.send(LoadEvent { seq, feed_id, result }).is_err() {
                tracing::debug!(seq, "Coordinator dropped before fetch resolved");
            }
        });
    }

    fn apply(&mut self, event: LoadEvent) -> Option<(Seq, RequestState)> {
        let LoadEvent {
            seq,
            feed_id,
            result,
        } = event;

        let Some(mut request) = self.requests.remove(&seq) else {
            tracing::warn!(seq, feed_id, "Fetch resolved for unknown request");
            return None;
        };

        let state = if seq != self.current_seq {
            match &result {
                Ok(entries) => tracing::debug!(
                    seq,
                    feed_id,
                    current = self.current_seq,
                    entries = entries.len(),
                    "Discarding superseded result"
                ),
                Err(e) => tracing::debug!(
                    seq,
                    feed_id,
                    current = self.current_seq,
                    error = %e,
                    "Discarding superseded failure"
                ),
            }
            RequestState::Superseded
        } else {
            match result {
                Ok(entries) => {
                    request.state = RequestState::Fetched;
                    tracing::trace!(seq, feed_id, state = ?request.state, entries = entries.len());
                    let fragment = self.renderer.render(&entries);
                    let elements = fragment.len();
                    if self.slot.commit(seq, request.feed_id, fragment) {
                        tracing::info!(seq, feed_id, elements, "Committed feed");
                        (request.on_done)(Ok(()));
                        RequestState::Committed
                    } else {
                        // The slot already holds a newer commit; treat like a stale result
                        RequestState::Superseded
                    }
                }
                Err(source) => {
                    tracing::warn!(seq, feed_id, error = %source, "Feed load failed");
                    (request.on_done)(Err(LoadError { feed_id, source }));
                    RequestState::Failed
                }
            }
        };

        debug_assert!(state.is_terminal());
        self.history.put(seq, state);
        Some((seq, state))
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
