use crate::load::request::Seq;
use crate::registry::FeedId;
use crate::render::{Fragment, RenderedEntry};

/// A fragment installed in the content area, with the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub seq: Seq,
    pub feed_id: FeedId,
    pub fragment: Fragment,
}

/// One visible element of the content area.
///
/// `entry` is `None` for the "no entries" placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotItem<'a> {
    pub position: usize,
    pub feed_id: FeedId,
    pub entry: Option<&'a RenderedEntry>,
}

/// The single shared rendering target.
///
/// Only [`LoadCoordinator`](crate::load::LoadCoordinator) writes to it, and
/// commits only ever move forward in sequence order.
#[derive(Debug, Default)]
pub struct ContentSlot {
    committed: Option<Commit>,
}

impl ContentSlot {
    /// Replaces the contents with `fragment`.
    ///
    /// Returns false (leaving the slot untouched) if `seq` is not newer than
    /// the commit already installed.
    pub(crate) fn commit(&mut self, seq: Seq, feed_id: FeedId, fragment: Fragment) -> bool {
        if let Some(current) = &self.committed {
            if current.seq >= seq {
                tracing::warn!(
                    seq,
                    committed_seq = current.seq,
                    "Refusing out-of-order commit"
                );
                return false;
            }
        }

        self.committed = Some(Commit {
            seq,
            feed_id,
            fragment,
        });
        true
    }

    pub fn current(&self) -> Option<&Commit> {
        self.committed.as_ref()
    }

    pub fn fragment(&self) -> Option<&Fragment> {
        self.committed.as_ref().map(|c| &c.fragment)
    }

    pub fn feed_id(&self) -> Option<FeedId> {
        self.committed.as_ref().map(|c| c.feed_id)
    }

    /// Number of rendered children; zero before the first commit.
    pub fn len(&self) -> usize {
        self.fragment().map_or(0, Fragment::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Markup of the committed fragment, or an empty string.
    pub fn html(&self) -> String {
        self.fragment().map(Fragment::html).unwrap_or_default()
    }

    /// Enumerates the visible elements with the feed they came from.
    pub fn items(&self) -> Vec<SlotItem<'_>> {
        let Some(commit) = &self.committed else {
            return Vec::new();
        };

        match &commit.fragment {
            Fragment::Entries { entries } => entries
                .iter()
                .enumerate()
                .map(|(position, entry)| SlotItem {
                    position,
                    feed_id: commit.feed_id,
                    entry: Some(entry),
                })
                .collect(),
            Fragment::NoEntries => vec![SlotItem {
                position: 0,
                feed_id: commit.feed_id,
                entry: None,
            }],
        }
    }
}
