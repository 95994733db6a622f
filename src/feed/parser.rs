use chrono::{DateTime, Utc};
use feed_rs::parser;
use serde::Serialize;

/// One item of a parsed feed.
///
/// Only constructed by [`parse_feed`]; everything downstream treats it as
/// read-only input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    pub title: String,
    /// Target of the entry, empty when the feed item carries no link.
    pub link: String,
    /// Raw summary as published (may contain markup, may be empty).
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
}

/// Parses RSS, Atom or JSON Feed bytes into entries, in document order.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>, parser::ParseFeedError> {
    let feed = parser::parse(bytes)?;

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();
            let summary = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default();
            let title = entry
                .title
                .map(|t| t.content.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string());

            FeedEntry {
                title,
                link,
                summary,
                published: entry.published.or(entry.updated),
            }
        })
        .collect();

    Ok(entries)
}
