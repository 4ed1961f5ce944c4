//! Cascade walking
//!
//! Walks a stylesheet's rule list in document order for one element,
//! reporting every matching style rule to a [`StyleSink`]. `@media` blocks
//! gate their contents on the current metrics, `@import` rules load lazily
//! through the embedder's [`StylesheetLoader`] with per-rule memoization
//! and a visited-URI guard against import cycles.
//!
//! Specificity, ordering and property merging are the sink's business; the
//! walker only guarantees document-order reporting.

use crate::css::loader::resolve_href;
use crate::css::loader::StylesheetLoader;
use crate::css::selectors::Selector;
use crate::css::types::DeclarationBlockRef;
use crate::css::types::Rule;
use crate::css::types::Stylesheet;
use crate::dom::Element;
use crate::error::Result;
use crate::style::context::MatchContext;
use crate::style::matcher::matches;
use crate::style::media::is_active;
use log::debug;
use log::warn;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Receives the declaration blocks of matching rules, in document order.
///
/// One call per (rule, matching selector) pair: a rule whose selector list
/// matches twice is reported twice, once per selector.
pub trait StyleSink {
  fn apply(&mut self, declarations: DeclarationBlockRef, selector: &Selector);
}

/// Applies a stylesheet to an element.
///
/// A disabled sheet contributes nothing. Recoverable load failures of
/// imported sheets degrade to an empty sheet; a selector that faults
/// during matching (a malformed `:not()` argument) only skips its own
/// rule.
///
/// # Errors
///
/// Propagates [`LoadError::Internal`] from the loader, the only load
/// failure that is not degraded.
///
/// [`LoadError::Internal`]: crate::css::loader::LoadError::Internal
pub fn apply<E, S, L>(
  sheet: &Stylesheet,
  element: &E,
  sink: &mut S,
  loader: &L,
  ctx: &MatchContext,
) -> Result<()>
where
  E: Element,
  S: StyleSink + ?Sized,
  L: StylesheetLoader + ?Sized,
{
  if !sheet.is_enabled() {
    return Ok(());
  }
  let mut visiting = FxHashSet::default();
  if let Some(uri) = sheet.uri() {
    visiting.insert(uri.to_string());
  }
  apply_rules(sheet, sheet.rules(), element, sink, loader, ctx, &mut visiting)
}

fn apply_rules<E, S, L>(
  sheet: &Stylesheet,
  rules: &[Rule],
  element: &E,
  sink: &mut S,
  loader: &L,
  ctx: &MatchContext,
  visiting: &mut FxHashSet<String>,
) -> Result<()>
where
  E: Element,
  S: StyleSink + ?Sized,
  L: StylesheetLoader + ?Sized,
{
  for rule in rules {
    match rule {
      Rule::Style {
        selectors,
        declarations,
      } => {
        let scoped = ctx.for_stylesheet(sheet);
        for selector in selectors {
          match matches(selector, element, &scoped) {
            Ok(true) => sink.apply(*declarations, selector),
            Ok(false) => {}
            Err(err) => debug!("skipping rule with malformed selector: {err}"),
          }
        }
      }

      Rule::Media { media, rules } => {
        if is_active(media, &ctx.media) {
          apply_rules(sheet, rules, element, sink, loader, ctx, visiting)?;
        }
      }

      Rule::Import { key, href, media } => {
        if !is_active(media, &ctx.media) {
          continue;
        }
        let resolved = resolve_href(sheet.uri(), href);
        let imported = match sheet.cached_import(*key) {
          Some(cached) => cached,
          None => {
            let loaded = match loader.load(&resolved) {
              Ok(loaded) => loaded,
              Err(err) if err.is_recoverable() => {
                warn!("import of '{resolved}' failed, treating as empty: {err}");
                Stylesheet::empty(Some(resolved.clone()))
              }
              Err(err) => return Err(err.into()),
            };
            let loaded = Arc::new(loaded);
            sheet.cache_import(*key, Arc::clone(&loaded));
            loaded
          }
        };
        // Guard on the imported sheet's own URI so a sheet reached over
        // two different hrefs is still recognized as the same sheet.
        let identity = imported.uri().unwrap_or(&resolved).to_string();
        if !visiting.insert(identity.clone()) {
          debug!("skipping circular import of '{identity}'");
          continue;
        }
        apply_rules(&imported, imported.rules(), element, sink, loader, ctx, visiting)?;
      }
    }
  }
  Ok(())
}
