//! CSS selector support
//!
//! The selector and condition ASTs the external CSS parser produces, the
//! An+B micro-grammar used by `nth-*` pseudo-classes, and the parser seam
//! through which `:not()` arguments are re-parsed at match time.
//!
//! The SAC-style integer type codes of classic parsers are modeled as
//! closed enums: the compiler forces every dispatch site to handle every
//! internally-known variant, and only genuinely foreign input falls back
//! to the logged `false` path.

use crate::error::CssSyntaxError;

// ============================================================================
// Selector AST
// ============================================================================

/// A selector pattern, as produced by the external parser.
///
/// Immutable once produced; owned by the stylesheet that contains it.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
  /// `*`
  Universal,
  /// A type selector such as `div`. A missing name acts as universal
  /// (some parsers emit it for namespace-only selectors).
  Type(Option<String>),
  /// The document root.
  Root,
  /// A simple selector refined by a condition, e.g. `div.foo[lang|=en]`.
  Compound {
    simple: Option<Box<Selector>>,
    condition: Condition,
  },
  /// `ancestor descendant`
  Descendant {
    ancestor: Box<Selector>,
    descendant: Box<Selector>,
  },
  /// `parent > child`
  Child {
    parent: Box<Selector>,
    child: Box<Selector>,
  },
  /// `prev + next`
  AdjacentSibling {
    prev: Box<Selector>,
    next: Box<Selector>,
  },
  /// `prev ~ next`
  GeneralSibling {
    prev: Box<Selector>,
    next: Box<Selector>,
  },
  /// `::name` (stored without colons)
  PseudoElement(String),
  /// Comment node selector; never matches an element.
  Comment,
  /// Text node selector; never matches an element.
  Text,
  /// CDATA section selector; never matches an element.
  Cdata,
  /// Processing instruction selector; never matches an element.
  ProcessingInstruction,
}

impl Selector {
  /// Convenience constructor for a type selector.
  pub fn tag(name: &str) -> Selector {
    Selector::Type(Some(name.to_string()))
  }

  /// Convenience constructor for a conditional selector over a type.
  pub fn compound(simple: Selector, condition: Condition) -> Selector {
    Selector::Compound {
      simple: Some(Box::new(simple)),
      condition,
    }
  }

  /// Convenience constructor for a bare condition (implicit universal).
  pub fn condition(condition: Condition) -> Selector {
    Selector::Compound {
      simple: None,
      condition,
    }
  }
}

/// A single predicate within a compound selector.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
  /// `#value`
  Id(String),
  /// `.value`
  ClassContains(String),
  /// `[name]`
  AttrExists(String),
  /// `[name="value"]`
  AttrEquals(String, String),
  /// `[name^="value"]`
  AttrPrefix(String, String),
  /// `[name$="value"]`
  AttrSuffix(String, String),
  /// `[name*="value"]`
  AttrSubstring(String, String),
  /// `[name~="value"]`
  AttrOneOf(String, String),
  /// `[name|="value"]`
  AttrHyphenList(String, String),
  /// `:lang(value)`
  Lang(String),
  /// Content condition: rendered text contains the given string.
  Content(String),
  /// `:only-child` in its SAC condition form.
  OnlyChild,
  /// `:only-of-type` in its SAC condition form.
  OnlyOfType,
  /// A pseudo-class such as `:first-child` or `:nth-child(2n+1)`. The
  /// argument text, if any, is kept raw; `nth-*` and `:not()` arguments
  /// are re-parsed at evaluation time.
  PseudoClass {
    name: String,
    args: Option<String>,
  },
  /// Conjunction of two conditions.
  And(Box<Condition>, Box<Condition>),
  /// Disjunction of two conditions.
  Or(Box<Condition>, Box<Condition>),
  /// Negation of a condition.
  Not(Box<Condition>),
}

impl Condition {
  /// Convenience constructor for an argument-less pseudo-class.
  pub fn pseudo(name: &str) -> Condition {
    Condition::PseudoClass {
      name: name.to_string(),
      args: None,
    }
  }

  /// Convenience constructor for a functional pseudo-class.
  pub fn pseudo_with_args(name: &str, args: &str) -> Condition {
    Condition::PseudoClass {
      name: name.to_string(),
      args: Some(args.to_string()),
    }
  }
}

/// Removes backslash escapes from a selector value: `\X` becomes `X`.
pub(crate) fn unescape(value: &str) -> String {
  if !value.contains('\\') {
    return value.to_string();
  }
  let mut out = String::with_capacity(value.len());
  let mut chars = value.chars();
  while let Some(c) = chars.next() {
    if c == '\\' {
      if let Some(next) = chars.next() {
        out.push(next);
      }
    } else {
      out.push(c);
    }
  }
  out
}

// ============================================================================
// External parser seam
// ============================================================================

/// Re-parses selector text at match time.
///
/// The engine never parses CSS text itself; `:not()` arguments are handed
/// back to the external parser through this trait, mirroring how real
/// browsers re-parse per match.
pub trait SelectorParser {
  /// Parses a comma-separated selector list.
  fn parse_selector_list(&self, text: &str) -> Result<Vec<Selector>, CssSyntaxError>;
}

// ============================================================================
// An+B micro-grammar
// ============================================================================

/// Parses an `nth-*` pseudo-class argument into `(a, b)` coefficients.
///
/// Case-insensitive. `odd` is `(2, 1)`, `even` is `(2, 0)`. Without an `n`
/// the whole argument is the constant `b`. Unparsable pieces default the
/// coefficient (`a` to 1, `b` to 0) rather than failing: the validator, not
/// this parser, rejects malformed arguments.
///
/// # Examples
///
/// ```
/// use stylecast::css::selectors::parse_nth;
///
/// assert_eq!(parse_nth("odd"), (2, 1));
/// assert_eq!(parse_nth("2n+1"), (2, 1));
/// assert_eq!(parse_nth("-n+3"), (-1, 3));
/// assert_eq!(parse_nth("5"), (0, 5));
/// ```
pub fn parse_nth(arg: &str) -> (i64, i64) {
  if arg.eq_ignore_ascii_case("odd") {
    return (2, 1);
  }
  if arg.eq_ignore_ascii_case("even") {
    return (2, 0);
  }

  let lower = arg.to_ascii_lowercase();
  let Some(n_index) = lower.find('n') else {
    return (0, lower.trim().parse().unwrap_or(0));
  };

  let coefficient = lower[..n_index].trim();
  let a = match coefficient {
    "" | "+" => 1,
    "-" => -1,
    other => other.parse().unwrap_or(1),
  };

  let mut constant = lower[n_index + 1..].trim();
  constant = constant.strip_prefix('+').unwrap_or(constant);
  let b = constant.parse().unwrap_or(0);

  (a, b)
}

/// Tests a 1-based position against An+B coefficients.
///
/// With `a == 0` only the exact positive index `b` matches; otherwise the
/// position must be reachable as `a * n + b` for some non-negative `n`.
pub fn nth_matches(a: i64, b: i64, index: i64) -> bool {
  if a == 0 {
    return index == b && b > 0;
  }
  let n = (index - b) as f64 / a as f64;
  n >= 0.0 && n.fract() == 0.0
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn odd_and_even_keywords() {
    for index in 1..=20 {
      let (a, b) = parse_nth("odd");
      assert_eq!(nth_matches(a, b, index), index % 2 == 1);
      let (a, b) = parse_nth("EVEN");
      assert_eq!(nth_matches(a, b, index), index % 2 == 0);
    }
  }

  #[test]
  fn two_n_plus_one_equals_odd() {
    for index in 1..=20 {
      let (a, b) = parse_nth("2n+1");
      let (oa, ob) = parse_nth("odd");
      assert_eq!(nth_matches(a, b, index), nth_matches(oa, ob, index));
    }
  }

  #[test]
  fn zero_coefficient_is_a_constant() {
    let (a, b) = parse_nth("0n+5");
    for index in 1..=20 {
      assert_eq!(nth_matches(a, b, index), index == 5);
    }
  }

  #[test]
  fn coefficient_shorthands() {
    assert_eq!(parse_nth("n"), (1, 0));
    assert_eq!(parse_nth("+n+2"), (1, 2));
    assert_eq!(parse_nth("-n+3"), (-1, 3));
    assert_eq!(parse_nth("-2n"), (-2, 0));
    assert_eq!(parse_nth("3n+4"), (3, 4));
    // Whitespace between the sign and the constant breaks the integer
    // parse, so the constant falls back to 0.
    assert_eq!(parse_nth(" 3n + 4 "), (3, 0));
  }

  #[test]
  fn plain_integer_argument() {
    assert_eq!(parse_nth("7"), (0, 7));
    assert_eq!(parse_nth("-3"), (0, -3));
    assert_eq!(parse_nth("garbage"), (0, 0));
  }

  #[test]
  fn negative_coefficient_matches_downward() {
    // -n+3 selects positions 1..=3
    let (a, b) = parse_nth("-n+3");
    let matched: Vec<i64> = (1..=10).filter(|&i| nth_matches(a, b, i)).collect();
    assert_eq!(matched, vec![1, 2, 3]);
  }

  #[test]
  fn non_positive_constant_never_matches_with_zero_a() {
    let (a, b) = parse_nth("0");
    assert!(!(1..=10).any(|i| nth_matches(a, b, i)));
    let (a, b) = parse_nth("-1");
    assert!(!(1..=10).any(|i| nth_matches(a, b, i)));
  }

  #[test]
  fn unescape_drops_backslashes() {
    assert_eq!(unescape(r"foo\.bar"), "foo.bar");
    assert_eq!(unescape(r"a\[b\]"), "a[b]");
    assert_eq!(unescape("plain"), "plain");
  }
}
