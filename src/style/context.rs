//! Matching context
//!
//! Everything that used to be ambient in classic engines (browser feature
//! toggles, compatibility quirks, viewport metrics) is threaded through
//! every call as an explicit value, so evaluation stays pure with respect
//! to engine state.

use crate::css::selectors::SelectorParser;
use crate::css::types::Stylesheet;
use crate::style::media::MediaContext;

/// Browser feature toggles consumed by matching and validation.
///
/// These come from the host's browser-emulation profile; defaults are all
/// off, i.e. the most permissive behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserFeatures {
  /// Pre-CSS3 documents (compatibility mode below 8) never match
  /// CSS3-only pseudo-classes.
  pub quirks_pseudo_restriction: bool,
  /// Disables `:target` entirely.
  pub no_fragment_target: bool,
  /// CSS3 pseudo-classes on a detached, childless query context node are
  /// a syntax fault instead of a silent non-match.
  pub css3_pseudo_require_attached: bool,
}

/// Transient state for a single match or cascade call. Never persisted.
#[derive(Clone, Copy)]
pub struct MatchContext<'a> {
  /// Browser feature toggles.
  pub features: BrowserFeatures,
  /// Viewport/device metrics for media query evaluation.
  pub media: MediaContext,
  /// Pseudo-element context, with its leading colon (e.g. `:before`).
  /// `None` means element styles.
  pub pseudo_element: Option<&'a str>,
  /// External parser used to re-parse `:not()` arguments at match time.
  /// Without one, `:not()` evaluation is a syntax fault.
  pub parser: Option<&'a dyn SelectorParser>,
  /// Stylesheet whose `:not()` cache should be consulted; set by the
  /// cascade walker for the sheet currently being traversed.
  pub(crate) not_cache: Option<&'a Stylesheet>,
}

impl<'a> MatchContext<'a> {
  /// Creates a context with default features and viewport.
  pub fn new() -> MatchContext<'a> {
    MatchContext {
      features: BrowserFeatures::default(),
      media: MediaContext::default(),
      pseudo_element: None,
      parser: None,
      not_cache: None,
    }
  }

  pub fn with_features(mut self, features: BrowserFeatures) -> MatchContext<'a> {
    self.features = features;
    self
  }

  pub fn with_media(mut self, media: MediaContext) -> MatchContext<'a> {
    self.media = media;
    self
  }

  pub fn with_pseudo_element(mut self, pseudo: Option<&'a str>) -> MatchContext<'a> {
    self.pseudo_element = pseudo;
    self
  }

  pub fn with_parser(mut self, parser: &'a dyn SelectorParser) -> MatchContext<'a> {
    self.parser = Some(parser);
    self
  }

  /// Context variant scoped to a stylesheet's `:not()` cache.
  pub(crate) fn for_stylesheet<'b>(&self, sheet: &'b Stylesheet) -> MatchContext<'b>
  where
    'a: 'b,
  {
    MatchContext {
      features: self.features,
      media: self.media,
      pseudo_element: self.pseudo_element,
      parser: self.parser,
      not_cache: Some(sheet),
    }
  }
}

impl<'a> Default for MatchContext<'a> {
  fn default() -> MatchContext<'a> {
    MatchContext::new()
  }
}
