//! Fixed, ordered registry of feed sources.
//!
//! A registry is built once (from the built-in list or the config file) and
//! never mutated afterwards. Feed ids are positions in the list, so they are
//! dense, stable and always in `[0, count)`.

use crate::util::{validate_feed_url, UrlValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Index of a feed within the registry.
pub type FeedId = usize;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Requested id is not in `[0, count)`.
    #[error("Feed id {id} out of range (registry has {count} feeds)")]
    OutOfRange { id: FeedId, count: usize },

    #[error("Feed registry is empty")]
    Empty,

    #[error("Feed at position {0} has an empty name")]
    EmptyName(usize),

    #[error("Feed at position {0} has an empty URL")]
    EmptyUrl(usize),

    #[error("Feed at position {position} has an invalid URL: {source}")]
    InvalidUrl {
        position: usize,
        #[source]
        source: UrlValidationError,
    },
}

/// A feed source as written in configuration: a display name and a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A registered feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedDescriptor {
    pub id: FeedId,
    pub name: String,
    pub url: String,
}

/// Immutable ordered list of feed descriptors.
#[derive(Debug, Clone)]
pub struct FeedRegistry {
    feeds: Vec<FeedDescriptor>,
}

/// Feeds shipped with the application when no configuration overrides them.
const DEFAULT_FEEDS: &[(&str, &str)] = &[
    ("Udacity Blog", "http://blog.udacity.com/feed"),
    ("CSS Tricks", "http://feeds.feedburner.com/CssTricks"),
    ("HTML5 Rocks", "http://feeds.feedburner.com/html5rocks"),
    ("Linear Digressions", "http://feeds.feedburner.com/udacity-linear-digressions"),
];

impl FeedRegistry {
    /// Builds a registry from sources, assigning ids by position.
    ///
    /// # Errors
    ///
    /// Rejects an empty list, blank names, blank URLs and URLs that are not
    /// `http`/`https`. The first offending position is reported.
    pub fn from_sources(sources: Vec<FeedSource>) -> Result<Self, RegistryError> {
        if sources.is_empty() {
            return Err(RegistryError::Empty);
        }

        let feeds = sources
            .into_iter()
            .enumerate()
            .map(|(id, source)| {
                let name = source.name.trim();
                if name.is_empty() {
                    return Err(RegistryError::EmptyName(id));
                }
                let url = source.url.trim();
                if url.is_empty() {
                    return Err(RegistryError::EmptyUrl(id));
                }
                validate_feed_url(url).map_err(|source| RegistryError::InvalidUrl {
                    position: id,
                    source,
                })?;

                Ok(FeedDescriptor {
                    id,
                    name: name.to_string(),
                    url: url.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { feeds })
    }

    /// Looks up a feed by id.
    pub fn get(&self, id: FeedId) -> Result<&FeedDescriptor, RegistryError> {
        self.feeds.get(id).ok_or(RegistryError::OutOfRange {
            id,
            count: self.feeds.len(),
        })
    }

    pub fn count(&self) -> usize {
        self.feeds.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeedDescriptor> {
        self.feeds.iter()
    }

    /// The built-in feed list as config-style sources.
    pub fn default_sources() -> Vec<FeedSource> {
        DEFAULT_FEEDS
            .iter()
            .map(|(name, url)| FeedSource::new(*name, *url))
            .collect()
    }
}

impl Default for FeedRegistry {
    fn default() -> Self {
        let feeds = DEFAULT_FEEDS
            .iter()
            .enumerate()
            .map(|(id, (name, url))| FeedDescriptor {
                id,
                name: name.to_string(),
                url: url.to_string(),
            })
            .collect();
        Self { feeds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn two_feeds() -> FeedRegistry {
        FeedRegistry::from_sources(vec![
            FeedSource::new("A", "https://a.example.com/rss"),
            FeedSource::new("B", "https://b.example.com/atom"),
        ])
        .unwrap()
    }

    #[test]
    fn test_default_registry_is_populated() {
        let registry = FeedRegistry::default();
        assert_ne!(registry.count(), 0);
        for feed in registry.iter() {
            assert!(!feed.name.is_empty());
            assert!(!feed.url.is_empty());
        }
    }

    #[test]
    fn test_default_sources_pass_validation() {
        let registry = FeedRegistry::from_sources(FeedRegistry::default_sources()).unwrap();
        assert_eq!(registry.count(), FeedRegistry::default().count());
    }

    #[test]
    fn test_ids_follow_positions() {
        let registry = two_feeds();
        assert_eq!(registry.get(0).unwrap().name, "A");
        assert_eq!(registry.get(1).unwrap().id, 1);
        assert_eq!(registry.get(1).unwrap().url, "https://b.example.com/atom");
    }

    #[test]
    fn test_out_of_range() {
        let registry = two_feeds();
        assert_eq!(
            registry.get(5),
            Err(RegistryError::OutOfRange { id: 5, count: 2 })
        );
        assert!(registry.get(2).is_err());
    }

    #[test]
    fn test_empty_list_rejected() {
        assert_eq!(
            FeedRegistry::from_sources(Vec::new()).unwrap_err(),
            RegistryError::Empty
        );
    }

    #[test]
    fn test_blank_fields_rejected() {
        let err = FeedRegistry::from_sources(vec![
            FeedSource::new("A", "https://a.example.com/rss"),
            FeedSource::new("   ", "https://b.example.com/rss"),
        ])
        .unwrap_err();
        assert_eq!(err, RegistryError::EmptyName(1));

        let err =
            FeedRegistry::from_sources(vec![FeedSource::new("A", "")]).unwrap_err();
        assert_eq!(err, RegistryError::EmptyUrl(0));
    }

    #[test]
    fn test_non_http_url_rejected() {
        let err = FeedRegistry::from_sources(vec![FeedSource::new("A", "ftp://a.example.com")])
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidUrl { position: 0, .. }));
    }

    proptest! {
        #[test]
        fn get_succeeds_exactly_in_range(count in 1usize..20, id in 0usize..40) {
            let sources = (0..count)
                .map(|i| FeedSource::new(format!("Feed {i}"), format!("https://example.com/{i}")))
                .collect();
            let registry = FeedRegistry::from_sources(sources).unwrap();
            prop_assert_eq!(registry.get(id).is_ok(), id < count);
        }
    }
}
