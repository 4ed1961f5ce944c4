//! Selector validation
//!
//! Gates a parsed selector list by document compatibility mode before any
//! of it is matched. Pre-CSS3 documents (mode below 9) only admit the CSS2
//! pseudo-class set; later modes admit the CSS3 set, with a special fault
//! for CSS3 pseudo-classes validated against a detached query context.
//!
//! Validation is shape-permissive: selector and condition kinds it has no
//! opinion on are logged and accepted, so new AST variants degrade softly
//! instead of rejecting whole rules.

use crate::css::selectors::Condition;
use crate::css::selectors::Selector;
use crate::dom::Element;
use crate::dom::Node;
use crate::error::CssSyntaxError;
use crate::style::context::BrowserFeatures;
use log::warn;
use regex::Regex;
use std::sync::LazyLock;

static NTH_NUMERIC: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));
static NTH_COMPLEX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[+-]?\d*n\w*([+-]\w\d*)?$").expect("valid regex"));

/// Pseudo-classes admitted in every compatibility mode.
static CSS2_PSEUDO_CLASSES: &[&str] = &[
  "link",
  "visited",
  "hover",
  "active",
  "focus",
  "lang",
  "first-child",
];

/// Additional pseudo-classes admitted from compatibility mode 9 on.
/// Functional entries are keyed with their arguments stripped to `()`.
static CSS3_PSEUDO_CLASSES: &[&str] = &[
  "checked",
  "disabled",
  "enabled",
  "indeterminated",
  "root",
  "target",
  "not()",
  "nth-child()",
  "nth-last-child()",
  "nth-of-type()",
  "nth-last-of-type()",
  "last-child",
  "first-of-type",
  "last-of-type",
  "only-child",
  "only-of-type",
  "empty",
];

/// Validates a selector list against a document compatibility mode.
///
/// `context_node` is the element the selectors will be matched against,
/// when known; it only participates in the detached-node fault below.
///
/// # Errors
///
/// Fails with [`CssSyntaxError::InvalidSelector`] when any selector in the
/// list uses a pseudo-class outside the mode's whitelist, and with
/// [`CssSyntaxError::DetachedPseudoClass`] when the relevant feature
/// toggle is set and a CSS3 pseudo-class is validated against a detached,
/// childless context node.
pub fn validate_selectors<E: Element>(
  selectors: &[Selector],
  document_mode: i32,
  context_node: Option<&E>,
  features: &BrowserFeatures,
) -> Result<(), CssSyntaxError> {
  for selector in selectors {
    if !is_valid_selector(selector, document_mode, context_node, features)? {
      return Err(CssSyntaxError::InvalidSelector(format!("{selector:?}")));
    }
  }
  Ok(())
}

fn is_valid_selector<E: Element>(
  selector: &Selector,
  mode: i32,
  node: Option<&E>,
  features: &BrowserFeatures,
) -> Result<bool, CssSyntaxError> {
  match selector {
    Selector::Type(_) => Ok(true),

    Selector::Compound { simple, condition } => {
      let simple_valid = match simple {
        Some(simple) => is_valid_selector(simple, mode, node, features)?,
        None => true,
      };
      Ok(simple_valid && is_valid_condition(condition, mode, node, features)?)
    }

    Selector::Descendant {
      ancestor,
      descendant,
    } => Ok(
      is_valid_selector(ancestor, mode, node, features)?
        && is_valid_selector(descendant, mode, node, features)?,
    ),

    Selector::Child { parent, child } => Ok(
      is_valid_selector(parent, mode, node, features)?
        && is_valid_selector(child, mode, node, features)?,
    ),

    Selector::AdjacentSibling { prev, next } | Selector::GeneralSibling { prev, next } => Ok(
      is_valid_selector(prev, mode, node, features)?
        && is_valid_selector(next, mode, node, features)?,
    ),

    other => {
      warn!("unhandled selector {other:?}, accepting it");
      Ok(true)
    }
  }
}

fn is_valid_condition<E: Element>(
  condition: &Condition,
  mode: i32,
  node: Option<&E>,
  features: &BrowserFeatures,
) -> Result<bool, CssSyntaxError> {
  match condition {
    Condition::And(left, right) => Ok(
      is_valid_condition(left, mode, node, features)?
        && is_valid_condition(right, mode, node, features)?,
    ),

    Condition::Id(_)
    | Condition::ClassContains(_)
    | Condition::AttrExists(_)
    | Condition::AttrEquals(..)
    | Condition::AttrPrefix(..)
    | Condition::AttrSuffix(..)
    | Condition::AttrSubstring(..)
    | Condition::AttrOneOf(..)
    | Condition::AttrHyphenList(..)
    | Condition::Lang(_)
    | Condition::Content(_)
    | Condition::OnlyChild
    | Condition::OnlyOfType => Ok(true),

    Condition::PseudoClass { name, args } => {
      // Functional pseudo-classes are whitelisted by "name()"; a bare
      // "()" or empty argument list is always rejected.
      let key = match args {
        Some(args) if args.is_empty() => return Ok(false),
        Some(_) => format!("{name}()"),
        None => name.clone(),
      };

      if mode < 9 {
        return Ok(CSS2_PSEUDO_CLASSES.contains(&key.as_str()));
      }

      if !CSS2_PSEUDO_CLASSES.contains(&key.as_str())
        && features.css3_pseudo_require_attached
      {
        if let Some(node) = node {
          if !node.is_attached() && node.as_node().first_child().is_none() {
            return Err(CssSyntaxError::DetachedPseudoClass);
          }
        }
      }

      if key == "nth-child()" {
        if let Some(args) = args {
          let args = args.trim();
          return Ok(
            args.eq_ignore_ascii_case("even")
              || args.eq_ignore_ascii_case("odd")
              || NTH_NUMERIC.is_match(args)
              || NTH_COMPLEX.is_match(args),
          );
        }
        return Ok(false);
      }

      Ok(
        CSS2_PSEUDO_CLASSES.contains(&key.as_str())
          || CSS3_PSEUDO_CLASSES.contains(&key.as_str()),
      )
    }

    other => {
      warn!("unhandled condition {other:?}, accepting it");
      Ok(true)
    }
  }
}
