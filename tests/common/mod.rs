//! Shared test helpers: a deliberately tiny selector parser covering just
//! the shapes `:not()` tests need.

use stylecast::css::selectors::{Condition, Selector, SelectorParser};
use stylecast::error::CssSyntaxError;

pub struct SimpleParser;

impl SelectorParser for SimpleParser {
  fn parse_selector_list(&self, text: &str) -> Result<Vec<Selector>, CssSyntaxError> {
    text.split(',').map(|part| parse_one(part.trim())).collect()
  }
}

fn parse_one(text: &str) -> Result<Selector, CssSyntaxError> {
  if text.is_empty() {
    return Err(CssSyntaxError::Parse("empty selector".into()));
  }
  if text == "*" {
    return Ok(Selector::Universal);
  }
  if let Some(class) = text.strip_prefix('.') {
    return Ok(Selector::condition(Condition::ClassContains(class.into())));
  }
  if let Some(id) = text.strip_prefix('#') {
    return Ok(Selector::condition(Condition::Id(id.into())));
  }
  if let Some(pseudo) = text.strip_prefix(':') {
    return Ok(match pseudo.split_once('(') {
      Some((name, args)) => Selector::condition(Condition::pseudo_with_args(
        name,
        args.trim_end_matches(')'),
      )),
      None => Selector::condition(Condition::pseudo(pseudo)),
    });
  }
  if let Some((tag, class)) = text.split_once('.') {
    return Ok(Selector::compound(
      Selector::tag(tag),
      Condition::ClassContains(class.into()),
    ));
  }
  if text.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
    return Ok(Selector::tag(text));
  }
  Err(CssSyntaxError::Parse(format!("unsupported selector '{text}'")))
}
