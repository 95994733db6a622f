//! Pure transformation from parsed entries to a content fragment.

use crate::feed::FeedEntry;
use crate::util::{escape_html, strip_control_chars, strip_markup, truncate_to_width};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;

/// Default snippet width in display columns.
pub const DEFAULT_SNIPPET_WIDTH: usize = 280;

/// Text shown in place of an empty feed.
pub const NO_ENTRIES_TEXT: &str = "No entries";

/// One entry as it appears in the content area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEntry {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub published: Option<DateTime<Utc>>,
}

/// Renderable content for the content area.
///
/// A fragment is never visually empty: a feed without entries renders as
/// [`Fragment::NoEntries`], which still counts as one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fragment {
    Entries { entries: Vec<RenderedEntry> },
    NoEntries,
}

impl Fragment {
    /// Number of rendered elements (the placeholder counts as one).
    pub fn len(&self) -> usize {
        match self {
            Fragment::Entries { entries } => entries.len(),
            Fragment::NoEntries => 1,
        }
    }

    /// Never true: an empty feed still renders the placeholder.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Fragment::NoEntries)
    }

    pub fn entries(&self) -> &[RenderedEntry] {
        match self {
            Fragment::Entries { entries } => entries,
            Fragment::NoEntries => &[],
        }
    }

    /// Stable HTML markup for the content area.
    ///
    /// Equal fragments always produce byte-identical markup.
    pub fn html(&self) -> String {
        let mut out = String::new();
        match self {
            Fragment::Entries { entries } => {
                for entry in entries {
                    let _ = write!(
                        out,
                        "<a class=\"entry-link\" href=\"{}\">\n<article class=\"entry\">\n<h2>{}</h2>\n",
                        escape_html(&entry.link),
                        escape_html(&entry.title),
                    );
                    if let Some(published) = entry.published {
                        let _ = writeln!(
                            out,
                            "<time datetime=\"{}\">{}</time>",
                            published.to_rfc3339(),
                            published.format("%Y-%m-%d")
                        );
                    }
                    let _ = write!(
                        out,
                        "<p>{}</p>\n</article>\n</a>\n",
                        escape_html(&entry.snippet)
                    );
                }
            }
            Fragment::NoEntries => {
                let _ = writeln!(
                    out,
                    "<article class=\"entry entry-empty\">\n<h2>{}</h2>\n</article>",
                    NO_ENTRIES_TEXT
                );
            }
        }
        out
    }

    /// Plain-text rendering for terminals.
    pub fn text(&self) -> String {
        let mut out = String::new();
        match self {
            Fragment::Entries { entries } => {
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    let _ = writeln!(out, "{}", entry.title);
                    if let Some(published) = entry.published {
                        let _ = writeln!(out, "  {}", published.format("%Y-%m-%d"));
                    }
                    if !entry.link.is_empty() {
                        let _ = writeln!(out, "  {}", entry.link);
                    }
                    if !entry.snippet.is_empty() {
                        let _ = writeln!(out, "  {}", entry.snippet);
                    }
                }
            }
            Fragment::NoEntries => {
                let _ = writeln!(out, "{}", NO_ENTRIES_TEXT);
            }
        }
        out
    }
}

/// Turns parsed entries into a [`Fragment`].
#[derive(Debug, Clone, Copy)]
pub struct FeedRenderer {
    snippet_width: usize,
}

impl Default for FeedRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_SNIPPET_WIDTH)
    }
}

impl FeedRenderer {
    pub fn new(snippet_width: usize) -> Self {
        Self { snippet_width }
    }

    pub fn render(&self, entries: &[FeedEntry]) -> Fragment {
        if entries.is_empty() {
            return Fragment::NoEntries;
        }

        let entries = entries
            .iter()
            .map(|entry| {
                let summary = strip_markup(&entry.summary);
                let summary = strip_control_chars(&summary);
                RenderedEntry {
                    title: strip_control_chars(entry.title.trim()).into_owned(),
                    link: strip_control_chars(entry.link.trim()).into_owned(),
                    snippet: truncate_to_width(&summary, self.snippet_width).into_owned(),
                    published: entry.published,
                }
            })
            .collect();

        Fragment::Entries { entries }
    }
}
