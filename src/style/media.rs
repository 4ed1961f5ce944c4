//! Media query evaluation
//!
//! Evaluates `@media` feature lists against viewport and device metrics.
//! A media list is OR logic over its queries, each query is AND logic over
//! its feature constraints, and only the `screen` and `all` media types
//! can ever be active in this engine.
//!
//! Metrics are supplied fresh per evaluation through [`MediaContext`] and
//! never cached here.

use crate::css::types::MediaFeatureValue;
use crate::css::types::MediaList;
use crate::css::types::MediaQuery;
use log::warn;

/// Viewport and device metrics for media query evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaContext {
  /// Viewport width in CSS pixels
  pub viewport_width: f32,
  /// Viewport height in CSS pixels
  pub viewport_height: f32,
  /// Device (screen) width in pixels
  pub device_width: f32,
  /// Device (screen) height in pixels
  pub device_height: f32,
  /// Device resolution in dots per inch
  pub device_dpi: f32,
}

impl MediaContext {
  /// Creates a context for a screen of the given viewport size, with the
  /// device metrics matching the viewport and a 96 dpi display.
  pub fn screen(viewport_width: f32, viewport_height: f32) -> MediaContext {
    MediaContext {
      viewport_width,
      viewport_height,
      device_width: viewport_width,
      device_height: viewport_height,
      device_dpi: 96.0,
    }
  }
}

impl Default for MediaContext {
  /// A desktop-sized default viewport.
  fn default() -> MediaContext {
    MediaContext::screen(1280.0, 1024.0)
  }
}

/// Returns whether the media list is active for the given metrics.
///
/// An empty list is an implicit `all` and is always active.
pub fn is_active(media: &MediaList, ctx: &MediaContext) -> bool {
  if media.is_empty() {
    return true;
  }
  media.queries.iter().any(|query| {
    let mut active = evaluate_query(query, ctx);
    if query.negated {
      active = !active;
    }
    active
  })
}

fn evaluate_query(query: &MediaQuery, ctx: &MediaContext) -> bool {
  let media_type = &query.media_type;
  if !media_type.eq_ignore_ascii_case("screen") && !media_type.eq_ignore_ascii_case("all") {
    return false;
  }
  query
    .features
    .iter()
    .all(|(name, value)| evaluate_feature(name, value, ctx))
}

/// Evaluates one feature constraint. An unparsable value for a known
/// feature fails the constraint (and with it the whole query); a feature
/// name this engine does not know is ignored.
fn evaluate_feature(name: &str, value: &MediaFeatureValue, ctx: &MediaContext) -> bool {
  match name {
    "max-width" => pixel_value(value).is_some_and(|v| v >= ctx.viewport_width),
    "min-width" => pixel_value(value).is_some_and(|v| v <= ctx.viewport_width),
    "max-height" => pixel_value(value).is_some_and(|v| v >= ctx.viewport_height),
    "min-height" => pixel_value(value).is_some_and(|v| v <= ctx.viewport_height),
    "max-device-width" => pixel_value(value).is_some_and(|v| v >= ctx.device_width),
    "min-device-width" => pixel_value(value).is_some_and(|v| v <= ctx.device_width),
    "max-device-height" => pixel_value(value).is_some_and(|v| v >= ctx.device_height),
    "min-device-height" => pixel_value(value).is_some_and(|v| v <= ctx.device_height),
    "resolution" => {
      resolution_value(value).is_some_and(|v| v.round() == ctx.device_dpi.round())
    }
    "max-resolution" => resolution_value(value).is_some_and(|v| v >= ctx.device_dpi),
    "min-resolution" => resolution_value(value).is_some_and(|v| v <= ctx.device_dpi),
    "orientation" => match value {
      MediaFeatureValue::Ident(orientation) if orientation == "portrait" => {
        ctx.viewport_width <= ctx.viewport_height
      }
      MediaFeatureValue::Ident(orientation) if orientation == "landscape" => {
        ctx.viewport_width >= ctx.viewport_height
      }
      other => {
        warn!("media value {other:?} not supported for feature 'orientation'");
        false
      }
    },
    _ => true,
  }
}

fn pixel_value(value: &MediaFeatureValue) -> Option<f32> {
  match value {
    MediaFeatureValue::Px(v) => Some(*v),
    other => {
      warn!("media value {other:?} has to be a 'px' value");
      None
    }
  }
}

/// Normalizes a resolution value to dots per inch.
fn resolution_value(value: &MediaFeatureValue) -> Option<f32> {
  if let MediaFeatureValue::Dimension { value, unit } = value {
    match unit.as_str() {
      "dpi" => return Some(*value),
      "dpcm" => return Some(2.54 * value),
      "dppx" => return Some(96.0 * value),
      _ => {}
    }
  }
  warn!("media value {value:?} is not a resolution");
  None
}

#[cfg(test)]
mod tests {
  use super::*;

  fn px(v: f32) -> MediaFeatureValue {
    MediaFeatureValue::Px(v)
  }

  #[test]
  fn empty_list_is_always_active() {
    assert!(is_active(&MediaList::all(), &MediaContext::screen(800.0, 600.0)));
  }

  #[test]
  fn max_width_thresholds() {
    let query = MediaQuery::for_type("screen").with_feature("max-width", px(600.0));
    let list = MediaList::from(vec![query]);
    assert!(!is_active(&list, &MediaContext::screen(800.0, 600.0)));
    assert!(is_active(&list, &MediaContext::screen(400.0, 600.0)));
    assert!(is_active(&list, &MediaContext::screen(600.0, 600.0)));
  }

  #[test]
  fn orientation_follows_viewport_aspect() {
    let landscape = MediaList::from(vec![
      MediaQuery::for_type("screen").with_feature("orientation", MediaFeatureValue::Ident("landscape".into())),
    ]);
    assert!(is_active(&landscape, &MediaContext::screen(800.0, 600.0)));
    assert!(!is_active(&landscape, &MediaContext::screen(600.0, 800.0)));
    // A square viewport satisfies both orientations.
    assert!(is_active(&landscape, &MediaContext::screen(700.0, 700.0)));
  }

  #[test]
  fn print_media_type_is_never_active() {
    let list = MediaList::from(vec![MediaQuery::for_type("print")]);
    assert!(!is_active(&list, &MediaContext::default()));
  }

  #[test]
  fn negated_query_flips() {
    let list = MediaList::from(vec![MediaQuery::for_type("print").negate()]);
    assert!(is_active(&list, &MediaContext::default()));
  }

  #[test]
  fn any_query_in_the_list_suffices() {
    let list = MediaList::from(vec![
      MediaQuery::for_type("print"),
      MediaQuery::for_type("screen"),
    ]);
    assert!(is_active(&list, &MediaContext::default()));
  }

  #[test]
  fn resolution_units_normalize_to_dpi() {
    let dpcm = MediaQuery::for_type("screen").with_feature(
      "min-resolution",
      MediaFeatureValue::Dimension {
        value: 37.795_276,
        unit: "dpcm".into(),
      },
    );
    // 37.8 dpcm is 96 dpi
    assert!(is_active(&MediaList::from(vec![dpcm]), &MediaContext::default()));

    let dppx = MediaQuery::for_type("screen").with_feature(
      "max-resolution",
      MediaFeatureValue::Dimension {
        value: 2.0,
        unit: "dppx".into(),
      },
    );
    assert!(is_active(&MediaList::from(vec![dppx]), &MediaContext::default()));
  }

  #[test]
  fn non_px_value_fails_the_whole_query() {
    let query = MediaQuery::for_type("screen")
      .with_feature(
        "max-width",
        MediaFeatureValue::Dimension {
          value: 40.0,
          unit: "em".into(),
        },
      )
      .with_feature("min-width", px(0.0));
    assert!(!is_active(&MediaList::from(vec![query]), &MediaContext::default()));
  }

  #[test]
  fn unknown_feature_is_ignored() {
    let query = MediaQuery::for_type("screen")
      .with_feature("prefers-color-scheme", MediaFeatureValue::Ident("dark".into()));
    assert!(is_active(&MediaList::from(vec![query]), &MediaContext::default()));
  }
}
