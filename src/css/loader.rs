//! Stylesheet loading boundary
//!
//! The engine does not fetch or parse CSS; `@import` resolution calls out
//! through the [`StylesheetLoader`] trait and the embedder brings its own
//! network/cache layer. Loading is a blocking call with no timeout or
//! cancellation hook here — a loader needing bounded latency implements
//! the timeout itself and reports it as an I/O failure, which the walker
//! degrades to an empty stylesheet.

use super::types::Stylesheet;
use log::warn;
use thiserror::Error;
use url::Url;

/// A stylesheet load failure.
///
/// HTTP failing statuses and I/O errors are expected, best-effort cases:
/// the cascade walker replaces the sheet with an empty one so a single
/// broken import cannot abort evaluation for the rest of the tree.
/// [`LoadError::Internal`] marks programming errors and propagates.
#[derive(Error, Debug)]
pub enum LoadError {
  /// The server answered with a failing status code.
  #[error("HTTP status {status} loading {url}")]
  HttpStatus { url: String, status: u16 },

  /// Transport-level failure (connect, read, timeout).
  #[error("I/O error loading {url}: {source}")]
  Io {
    url: String,
    #[source]
    source: std::io::Error,
  },

  /// Unexpected loader failure; never degraded, always propagated.
  #[error("{0}")]
  Internal(String),
}

impl LoadError {
  /// Whether the walker may degrade this failure to an empty stylesheet.
  pub fn is_recoverable(&self) -> bool {
    matches!(self, LoadError::HttpStatus { .. } | LoadError::Io { .. })
  }
}

/// Fetches and parses a stylesheet by absolute URL.
///
/// Implemented by the embedder; the cascade walker calls it at most once
/// per `@import` rule instance and memoizes the result in the importing
/// sheet. Retry policy, if any, belongs to the implementation.
pub trait StylesheetLoader {
  fn load(&self, url: &str) -> Result<Stylesheet, LoadError>;
}

/// Resolves a possibly-relative `@import` href against the importing
/// sheet's URI.
///
/// Absolute hrefs pass through unchanged. Without a usable base a relative
/// href cannot be resolved and is returned as-is, leaving it to the loader
/// to reject.
pub fn resolve_href(base: Option<&str>, href: &str) -> String {
  let href = href.trim();
  if let Ok(absolute) = Url::parse(href) {
    return absolute.to_string();
  }
  if let Some(base) = base {
    match Url::parse(base).and_then(|b| b.join(href)) {
      Ok(resolved) => return resolved.to_string(),
      Err(err) => {
        warn!("cannot resolve import href '{href}' against '{base}': {err}");
      }
    }
  }
  href.to_string()
}
