//! CSS type definitions
//!
//! Core types for representing parsed stylesheets: rules, media query
//! lists and the stylesheet container with its lazily populated `@import`
//! cache. The AST is read-only from the engine's perspective; the two
//! caches are the only interior-mutable state and assume single-writer
//! confinement (one style-computation pass per document at a time).

use super::selectors::Selector;
use rustc_hash::FxHashMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

// ============================================================================
// Declaration blocks
// ============================================================================

/// Opaque handle to a declaration block owned by the external store.
///
/// The cascade walker hands these to the style sink; it never looks
/// inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclarationBlockRef(pub u64);

// ============================================================================
// Media queries
// ============================================================================

/// A media feature value as the external parser hands it over.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaFeatureValue {
  /// A pixel length, e.g. `600px`.
  Px(f32),
  /// A dimension with a non-pixel unit, e.g. `300dpi` or `2dppx`.
  Dimension { value: f32, unit: String },
  /// An identifier, e.g. `landscape`.
  Ident(String),
}

/// A single media query: `screen and (max-width: 600px)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaQuery {
  /// The media type (`screen`, `all`, `print`, ...), compared
  /// case-insensitively.
  pub media_type: String,
  /// Whether the query was prefixed with `not`.
  pub negated: bool,
  /// Feature constraints; all must hold (AND logic).
  pub features: Vec<(String, MediaFeatureValue)>,
}

impl MediaQuery {
  /// Creates a query for the given media type with no feature constraints.
  pub fn for_type(media_type: &str) -> MediaQuery {
    MediaQuery {
      media_type: media_type.to_string(),
      negated: false,
      features: Vec::new(),
    }
  }

  /// Adds a feature constraint.
  pub fn with_feature(mut self, name: &str, value: MediaFeatureValue) -> MediaQuery {
    self.features.push((name.to_string(), value));
    self
  }

  /// Marks the query as negated.
  pub fn negate(mut self) -> MediaQuery {
    self.negated = true;
    self
  }
}

/// An ordered list of media queries. An empty list means `all`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaList {
  pub queries: Vec<MediaQuery>,
}

impl MediaList {
  /// The empty list, equivalent to `all`.
  pub fn all() -> MediaList {
    MediaList::default()
  }

  pub fn is_empty(&self) -> bool {
    self.queries.is_empty()
  }
}

impl From<Vec<MediaQuery>> for MediaList {
  fn from(queries: Vec<MediaQuery>) -> MediaList {
    MediaList { queries }
  }
}

// ============================================================================
// Rules
// ============================================================================

/// Identity of an `@import` rule instance.
///
/// The import cache is keyed by this, not by href: two `@import` rules
/// naming the same URL are distinct cache entries, exactly one cached
/// child stylesheet per rule instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImportKey(u64);

impl ImportKey {
  fn next() -> ImportKey {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    ImportKey(NEXT.fetch_add(1, Ordering::Relaxed))
  }
}

/// A stylesheet rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
  /// A style rule. Selectors are OR'd: each one is matched and reported
  /// to the sink independently, never merged.
  Style {
    selectors: Vec<Selector>,
    declarations: DeclarationBlockRef,
  },
  /// An `@import` rule.
  Import {
    key: ImportKey,
    href: String,
    media: MediaList,
  },
  /// An `@media` block.
  Media { media: MediaList, rules: Vec<Rule> },
}

impl Rule {
  /// Creates a style rule.
  pub fn style(selectors: Vec<Selector>, declarations: DeclarationBlockRef) -> Rule {
    Rule::Style {
      selectors,
      declarations,
    }
  }

  /// Creates an `@import` rule with a fresh cache identity.
  pub fn import(href: &str, media: MediaList) -> Rule {
    Rule::Import {
      key: ImportKey::next(),
      href: href.to_string(),
      media,
    }
  }

  /// Creates an `@media` rule.
  pub fn media(media: MediaList, rules: Vec<Rule>) -> Rule {
    Rule::Media { media, rules }
  }
}

// ============================================================================
// Stylesheet
// ============================================================================

/// A parsed stylesheet: an ordered rule list plus source identity.
///
/// The `imports` cache maps each `@import` rule to the stylesheet it
/// loaded, populated lazily on first traversal and never evicted. The
/// `not_selectors` cache keeps parsed-and-validated `:not()` arguments so
/// identical argument strings are not re-parsed on every match. Both are
/// internally locked but not meant for concurrent cascade walks; callers
/// needing that must synchronize externally.
#[derive(Debug)]
pub struct Stylesheet {
  rules: Vec<Rule>,
  uri: Option<String>,
  enabled: bool,
  imports: Mutex<FxHashMap<ImportKey, Arc<Stylesheet>>>,
  not_selectors: Mutex<FxHashMap<String, Selector>>,
}

impl Stylesheet {
  /// Creates a stylesheet from parsed rules.
  ///
  /// `uri` is the sheet's own location, used to resolve relative
  /// `@import` hrefs; inline and anonymous sheets pass `None`.
  pub fn new(rules: Vec<Rule>, uri: Option<String>) -> Stylesheet {
    Stylesheet {
      rules,
      uri,
      enabled: true,
      imports: Mutex::new(FxHashMap::default()),
      not_selectors: Mutex::new(FxHashMap::default()),
    }
  }

  /// Creates an empty stylesheet, the degraded form of a failed load.
  pub fn empty(uri: Option<String>) -> Stylesheet {
    Stylesheet::new(Vec::new(), uri)
  }

  pub fn rules(&self) -> &[Rule] {
    &self.rules
  }

  pub fn uri(&self) -> Option<&str> {
    self.uri.as_deref()
  }

  /// Whether the cascade walker should consider this sheet at all.
  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  pub fn set_enabled(&mut self, enabled: bool) {
    self.enabled = enabled;
  }

  pub(crate) fn cached_import(&self, key: ImportKey) -> Option<Arc<Stylesheet>> {
    self.imports.lock().ok()?.get(&key).cloned()
  }

  pub(crate) fn cache_import(&self, key: ImportKey, sheet: Arc<Stylesheet>) {
    if let Ok(mut imports) = self.imports.lock() {
      imports.entry(key).or_insert(sheet);
    }
  }

  pub(crate) fn cached_not_selector(&self, args: &str) -> Option<Selector> {
    self.not_selectors.lock().ok()?.get(args).cloned()
  }

  pub(crate) fn cache_not_selector(&self, args: &str, selector: Selector) {
    if let Ok(mut cache) = self.not_selectors.lock() {
      cache.entry(args.to_string()).or_insert(selector);
    }
  }
}
