//! Selector and condition matching
//!
//! The pattern-matching interpreter at the heart of the engine: combinator
//! dispatch over the selector AST, predicate dispatch over conditions, and
//! the structural/state pseudo-class evaluator.
//!
//! Matching is pure with respect to engine state and re-reads the live DOM
//! on every call. The only faults it can raise are CSS syntax faults from
//! `:not()` argument re-parsing; everything else the parser can produce is
//! total (unknown kinds log and evaluate to `false`).

use crate::css::selectors::nth_matches;
use crate::css::selectors::parse_nth;
use crate::css::selectors::unescape;
use crate::css::selectors::Condition;
use crate::css::selectors::Selector;
use crate::dom::Document;
use crate::dom::Element;
use crate::dom::Node;
use crate::error::CssSyntaxError;
use crate::style::context::MatchContext;
use crate::style::validator::validate_selectors;
use log::warn;

/// Returns whether the selector selects the element.
///
/// The pseudo-element context, if any, comes from
/// [`MatchContext::pseudo_element`] and is honored only by pseudo-element
/// selectors reached directly or through descendant combinators.
///
/// # Errors
///
/// Fails only when a `:not()` argument is malformed or cannot be parsed;
/// such faults are caller-supplied malformed input and are never silently
/// swallowed.
pub fn matches<E: Element>(
  selector: &Selector,
  element: &E,
  ctx: &MatchContext,
) -> Result<bool, CssSyntaxError> {
  matches_with_pseudo(selector, element, ctx.pseudo_element, ctx)
}

fn matches_with_pseudo<E: Element>(
  selector: &Selector,
  element: &E,
  pseudo: Option<&str>,
  ctx: &MatchContext,
) -> Result<bool, CssSyntaxError> {
  match selector {
    Selector::Universal => Ok(true),

    // A type selector without a local name acts as universal.
    Selector::Type(None) => Ok(true),
    Selector::Type(Some(name)) => Ok(name.eq_ignore_ascii_case(&element.local_name())),

    Selector::Root => Ok(
      element
        .document()
        .and_then(|doc| doc.root_element())
        .is_some_and(|root| root == *element),
    ),

    Selector::Compound { simple, condition } => {
      let simple_matches = match simple {
        Some(simple) => matches_with_pseudo(simple, element, None, ctx)?,
        None => true,
      };
      Ok(simple_matches && matches_condition(condition, element, ctx)?)
    }

    Selector::Descendant {
      ancestor,
      descendant,
    } => {
      if !matches_with_pseudo(descendant, element, pseudo, ctx)? {
        return Ok(false);
      }
      let mut node = element.as_node();
      // For a pseudo-element leaf the ancestor scan starts at the
      // element itself, otherwise at its parent.
      if !matches!(descendant.as_ref(), Selector::PseudoElement(_)) {
        match node.parent() {
          Some(parent) => node = parent,
          None => return Ok(false),
        }
      }
      loop {
        let Some(ancestor_element) = node.as_element() else {
          // Reached the document or a fragment boundary.
          return Ok(false);
        };
        if matches_with_pseudo(ancestor, &ancestor_element, pseudo, ctx)? {
          return Ok(true);
        }
        match node.parent() {
          Some(parent) => node = parent,
          None => return Ok(false),
        }
      }
    }

    Selector::Child { parent, child } => {
      let Some(parent_node) = element.as_node().parent() else {
        return Ok(false);
      };
      // The parent must be a real element, not a page or fragment.
      let Some(parent_element) = parent_node.as_element() else {
        return Ok(false);
      };
      Ok(
        matches_with_pseudo(child, element, None, ctx)?
          && matches_with_pseudo(parent, &parent_element, None, ctx)?,
      )
    }

    Selector::AdjacentSibling { prev, next } => {
      let mut sibling = element.as_node().prev_sibling();
      while let Some(node) = sibling {
        if let Some(prev_element) = node.as_element() {
          return Ok(
            matches_with_pseudo(prev, &prev_element, None, ctx)?
              && matches_with_pseudo(next, element, None, ctx)?,
          );
        }
        sibling = node.prev_sibling();
      }
      Ok(false)
    }

    Selector::GeneralSibling { prev, next } => {
      let mut sibling = element.as_node().prev_sibling();
      while let Some(node) = sibling {
        if let Some(prev_element) = node.as_element() {
          if matches_with_pseudo(prev, &prev_element, None, ctx)?
            && matches_with_pseudo(next, element, None, ctx)?
          {
            return Ok(true);
          }
        }
        sibling = node.prev_sibling();
      }
      Ok(false)
    }

    Selector::PseudoElement(name) => Ok(
      pseudo
        .and_then(|p| p.strip_prefix(':'))
        .is_some_and(|p| p == name.as_str()),
    ),

    // Non-element node selectors never select an element.
    Selector::Comment | Selector::Text | Selector::Cdata | Selector::ProcessingInstruction => {
      Ok(false)
    }
  }
}

/// Returns whether a single condition holds for the element.
pub fn matches_condition<E: Element>(
  condition: &Condition,
  element: &E,
  ctx: &MatchContext,
) -> Result<bool, CssSyntaxError> {
  match condition {
    Condition::Id(value) => Ok(*value == element.id()),

    Condition::ClassContains(value) => {
      let value = unescape(value);
      let class_attr = element.attribute("class").unwrap_or_default();
      Ok(selects_whitespace_separated(&value, &class_attr))
    }

    Condition::AttrExists(name) => Ok(element.attribute(name).is_some()),

    Condition::AttrEquals(name, value) => {
      let value = unescape(value);
      // Absent attribute is not the same as an empty value.
      Ok(element.attribute(name).is_some_and(|attr| attr == value))
    }

    Condition::AttrPrefix(name, value) => Ok(
      !value.is_empty()
        && element
          .attribute(name)
          .unwrap_or_default()
          .starts_with(value.as_str()),
    ),

    Condition::AttrSuffix(name, value) => Ok(
      !value.is_empty()
        && element
          .attribute(name)
          .unwrap_or_default()
          .ends_with(value.as_str()),
    ),

    Condition::AttrSubstring(name, value) => Ok(
      !value.is_empty()
        && element
          .attribute(name)
          .unwrap_or_default()
          .contains(value.as_str()),
    ),

    Condition::AttrOneOf(name, value) => {
      let attr = element.attribute(name).unwrap_or_default();
      Ok(selects_separated(value, &attr, ' '))
    }

    Condition::AttrHyphenList(name, value) => {
      if value.is_empty() {
        return Ok(false);
      }
      let attr = element.attribute(name).unwrap_or_default();
      Ok(
        attr == *value
          || attr
            .strip_prefix(value.as_str())
            .is_some_and(|rest| rest.starts_with('-')),
      )
    }

    Condition::Lang(value) => {
      // "en" and "en-GB" are matched by "en" but "english" is not.
      let mut current = Some(element.clone());
      while let Some(el) = current {
        if let Some(lang) = el.attribute("lang") {
          return Ok(
            lang == *value
              || (lang.starts_with(value.as_str()) && lang[value.len()..].starts_with('-')),
          );
        }
        current = el.as_node().parent().and_then(|p| p.as_element());
      }
      Ok(false)
    }

    Condition::Content(text) => Ok(element.text_content().contains(text.as_str())),

    // Literal legacy semantic: the parent must have exactly one child
    // node of any kind, not just one element child.
    Condition::OnlyChild => {
      let Some(parent) = element.as_node().parent() else {
        return Ok(false);
      };
      let mut count = 0;
      let mut child = parent.first_child();
      while let Some(node) = child {
        count += 1;
        child = node.next_sibling();
      }
      Ok(count == 1)
    }

    // Literal legacy semantic: uniqueness of the tag name across the
    // entire document. O(document size).
    Condition::OnlyOfType => {
      let tag = element.local_name();
      let Some(root) = element.document().and_then(|doc| doc.root_element()) else {
        return Ok(false);
      };
      let mut count = 0u32;
      let mut stack = vec![root.as_node()];
      while let Some(node) = stack.pop() {
        if let Some(el) = node.as_element() {
          if el.local_name() == tag {
            count += 1;
            if count > 1 {
              return Ok(false);
            }
          }
        }
        let mut child = node.first_child();
        while let Some(c) = child {
          let next = c.next_sibling();
          stack.push(c);
          child = next;
        }
      }
      Ok(count == 1)
    }

    Condition::PseudoClass { name, args } => eval_pseudo(name, args.as_deref(), element, ctx),

    Condition::And(left, right) => {
      Ok(matches_condition(left, element, ctx)? && matches_condition(right, element, ctx)?)
    }
    Condition::Or(left, right) => {
      Ok(matches_condition(left, element, ctx)? || matches_condition(right, element, ctx)?)
    }
    Condition::Not(inner) => Ok(!matches_condition(inner, element, ctx)?),
  }
}

/// Evaluates a pseudo-class against the element.
pub fn eval_pseudo<E: Element>(
  name: &str,
  args: Option<&str>,
  element: &E,
  ctx: &MatchContext,
) -> Result<bool, CssSyntaxError> {
  // Pre-CSS3 documents never match CSS3-only pseudo-classes.
  if ctx.features.quirks_pseudo_restriction {
    if let Some(doc) = element.document() {
      if doc.compatibility_mode() < 8 {
        return Ok(false);
      }
    }
  }

  match name {
    "root" => Ok(
      element
        .document()
        .and_then(|doc| doc.root_element())
        .is_some_and(|root| root == *element),
    ),

    "enabled" => Ok(element.disabled_state() == Some(false)),
    "disabled" => Ok(element.disabled_state() == Some(true)),

    "focus" => Ok(
      element
        .document()
        .and_then(|doc| doc.focused_element())
        .is_some_and(|focused| focused == *element),
    ),

    "checked" => Ok(element.checked_state() == Some(true)),

    "first-child" => Ok(!has_element_sibling(element, Direction::Before, None)),
    "last-child" => Ok(!has_element_sibling(element, Direction::After, None)),

    "first-of-type" => {
      let tag = element.local_name();
      Ok(!has_element_sibling(element, Direction::Before, Some(tag.as_str())))
    }
    "last-of-type" => {
      let tag = element.local_name();
      Ok(!has_element_sibling(element, Direction::After, Some(tag.as_str())))
    }

    "only-child" => Ok(
      !has_element_sibling(element, Direction::Before, None)
        && !has_element_sibling(element, Direction::After, None),
    ),
    "only-of-type" => {
      let tag = element.local_name();
      Ok(
        !has_element_sibling(element, Direction::Before, Some(tag.as_str()))
          && !has_element_sibling(element, Direction::After, Some(tag.as_str())),
      )
    }

    // Any text node counts as content, including whitespace-only ones.
    "empty" => {
      let mut child = element.as_node().first_child();
      while let Some(node) = child {
        if node.as_element().is_some() || node.is_text() {
          return Ok(false);
        }
        child = node.next_sibling();
      }
      Ok(true)
    }

    "target" => {
      if ctx.features.no_fragment_target {
        return Ok(false);
      }
      let Some(fragment) = element.document().and_then(|doc| doc.url_fragment()) else {
        return Ok(false);
      };
      Ok(!fragment.trim().is_empty() && fragment == element.id())
    }

    "nth-child" => {
      let (a, b) = parse_nth(args.unwrap_or(""));
      Ok(nth_matches(a, b, sibling_position(element, Direction::Before, false)))
    }
    "nth-last-child" => {
      let (a, b) = parse_nth(args.unwrap_or(""));
      Ok(nth_matches(a, b, sibling_position(element, Direction::After, false)))
    }
    "nth-of-type" => {
      let (a, b) = parse_nth(args.unwrap_or(""));
      Ok(nth_matches(a, b, sibling_position(element, Direction::Before, true)))
    }
    "nth-last-of-type" => {
      let (a, b) = parse_nth(args.unwrap_or(""));
      Ok(nth_matches(a, b, sibling_position(element, Direction::After, true)))
    }

    "not" => eval_not(args, element, ctx),

    other => {
      warn!("unsupported pseudo-class ':{other}'");
      Ok(false)
    }
  }
}

/// `:not()` re-parses its argument through the external parser at match
/// time, caching the parsed-and-validated selector per argument string
/// when a stylesheet cache is in scope.
fn eval_not<E: Element>(
  args: Option<&str>,
  element: &E,
  ctx: &MatchContext,
) -> Result<bool, CssSyntaxError> {
  let Some(args) = args else {
    return Err(CssSyntaxError::InvalidNotArgument(String::new()));
  };

  let selector = match ctx.not_cache.and_then(|sheet| sheet.cached_not_selector(args)) {
    Some(cached) => cached,
    None => {
      let Some(parser) = ctx.parser else {
        return Err(CssSyntaxError::Parse(format!(
          "no selector parser available for :not({args})"
        )));
      };
      let list = parser
        .parse_selector_list(args)
        .map_err(|_| CssSyntaxError::InvalidNotArgument(args.to_string()))?;
      if list.len() != 1 {
        return Err(CssSyntaxError::InvalidNotArgument(args.to_string()));
      }
      let Some(selector) = list.into_iter().next() else {
        return Err(CssSyntaxError::InvalidNotArgument(args.to_string()));
      };
      validate_selectors(std::slice::from_ref(&selector), 9, Some(element), &ctx.features)?;
      if let Some(sheet) = ctx.not_cache {
        sheet.cache_not_selector(args, selector.clone());
      }
      selector
    }
  };

  Ok(!matches_with_pseudo(&selector, element, None, ctx)?)
}

#[derive(Clone, Copy)]
enum Direction {
  Before,
  After,
}

fn step<N: Node>(node: &N, direction: Direction) -> Option<N> {
  match direction {
    Direction::Before => node.prev_sibling(),
    Direction::After => node.next_sibling(),
  }
}

/// Whether any sibling in the given direction is an element (optionally
/// restricted to the given tag name).
fn has_element_sibling<E: Element>(element: &E, direction: Direction, tag: Option<&str>) -> bool {
  let mut node = step(&element.as_node(), direction);
  while let Some(current) = node {
    if let Some(el) = current.as_element() {
      if tag.is_none_or(|t| el.local_name() == t) {
        return true;
      }
    }
    node = step(&current, direction);
  }
  false
}

/// 1-based position of the element among its element siblings, counting
/// from the start (`Before`) or the end (`After`), optionally counting
/// only siblings sharing the element's tag name.
fn sibling_position<E: Element>(element: &E, direction: Direction, same_type: bool) -> i64 {
  let tag = element.local_name();
  let mut index = 0;
  let mut node = Some(element.as_node());
  while let Some(current) = node {
    if let Some(el) = current.as_element() {
      if !same_type || el.local_name() == tag {
        index += 1;
      }
    }
    node = step(&current, direction);
  }
  index
}

/// Whitespace-bounded containment: `value` must occur in `attribute`
/// delimited by whitespace or the string edges on both sides.
fn selects_whitespace_separated(value: &str, attribute: &str) -> bool {
  if value.is_empty() || attribute.len() < value.len() {
    return false;
  }
  let mut search_from = 0;
  while let Some(found) = attribute[search_from..].find(value) {
    let start = search_from + found;
    let end = start + value.len();
    let bounded_before = attribute[..start]
      .chars()
      .next_back()
      .is_none_or(char::is_whitespace);
    let bounded_after = attribute[end..].chars().next().is_none_or(char::is_whitespace);
    if bounded_before && bounded_after {
      return true;
    }
    // Rescan from the next char boundary; a byte step would split a
    // multi-byte character at the front of the match.
    search_from = start + value.chars().next().map_or(1, char::len_utf8);
  }
  false
}

/// Separator-bounded token match: `value` equals `attribute`, or occurs
/// as a leading, trailing or interior token delimited by `separator`.
fn selects_separated(value: &str, attribute: &str, separator: char) -> bool {
  if value.is_empty() || attribute.len() < value.len() {
    return false;
  }
  if attribute.len() == value.len() {
    return attribute == value;
  }
  if attribute.starts_with(value) && attribute[value.len()..].starts_with(separator) {
    return true;
  }
  if attribute.ends_with(value)
    && attribute[..attribute.len() - value.len()].ends_with(separator)
  {
    return true;
  }
  let interior = format!("{separator}{value}{separator}");
  attribute.contains(&interior)
}
