//! Utility functions for common operations.
//!
//! - **URL validation**: scheme and host checks for feed URLs
//! - **Text processing**: markup stripping, escaping and width-aware truncation
//!
//! # Examples
//!
//! ```
//! use feedpane::util::{escape_html, strip_markup, truncate_to_width, validate_feed_url};
//!
//! let url = validate_feed_url("https://example.com/feed.xml").unwrap();
//! assert_eq!(url.scheme(), "https");
//!
//! let text = strip_markup("<p>Breaking <em>news</em></p>");
//! assert_eq!(text, "Breaking news");
//! assert_eq!(truncate_to_width(&text, 11), "Breaking...");
//! assert_eq!(escape_html("a < b"), "a &lt; b");
//! ```

mod text;
mod url_validator;

pub use text::{escape_html, strip_control_chars, strip_markup, truncate_to_width};
pub use url_validator::{validate_feed_url, UrlValidationError};
