//! Cascade walking: rule ordering, media gating and `@import` resolution.

use std::cell::Cell;
use std::collections::HashMap;

use stylecast::css::loader::{LoadError, StylesheetLoader};
use stylecast::css::selectors::{Condition, Selector};
use stylecast::css::types::{
  DeclarationBlockRef, MediaFeatureValue, MediaList, MediaQuery, Rule, Stylesheet,
};
use stylecast::dom::{TreeElement, TreeNode};
use stylecast::style::{apply, MatchContext, MediaContext, StyleSink};

struct Recorder {
  applied: Vec<DeclarationBlockRef>,
}

impl Recorder {
  fn new() -> Recorder {
    Recorder {
      applied: Vec::new(),
    }
  }
}

impl StyleSink for Recorder {
  fn apply(&mut self, declarations: DeclarationBlockRef, _selector: &Selector) {
    self.applied.push(declarations);
  }
}

/// Serves canned rule lists by URL, counting loads. Unknown URLs get a 404.
struct MapLoader {
  sheets: HashMap<String, Vec<Rule>>,
  calls: Cell<usize>,
}

impl MapLoader {
  fn new(sheets: Vec<(&str, Vec<Rule>)>) -> MapLoader {
    MapLoader {
      sheets: sheets
        .into_iter()
        .map(|(url, rules)| (url.to_string(), rules))
        .collect(),
      calls: Cell::new(0),
    }
  }
}

impl StylesheetLoader for MapLoader {
  fn load(&self, url: &str) -> Result<Stylesheet, LoadError> {
    self.calls.set(self.calls.get() + 1);
    match self.sheets.get(url) {
      Some(rules) => Ok(Stylesheet::new(rules.clone(), Some(url.to_string()))),
      None => Err(LoadError::HttpStatus {
        url: url.to_string(),
        status: 404,
      }),
    }
  }
}

struct FailingLoader;

impl StylesheetLoader for FailingLoader {
  fn load(&self, _url: &str) -> Result<Stylesheet, LoadError> {
    Err(LoadError::Internal("loader bug".into()))
  }
}

fn decl(n: u64) -> DeclarationBlockRef {
  DeclarationBlockRef(n)
}

fn div_rule(n: u64) -> Rule {
  Rule::style(vec![Selector::tag("div")], decl(n))
}

/// A document containing a single `div.note` in the body.
fn note_div() -> TreeElement {
  let doc = TreeNode::document();
  let html = TreeNode::element("html");
  let body = TreeNode::element("body");
  let div = TreeNode::element("div").attr("class", "note");
  body.append(div.clone());
  html.append(body);
  doc.append(html);
  div.to_element().unwrap()
}

#[test]
fn matching_rules_report_in_document_order() {
  let sheet = Stylesheet::new(
    vec![
      div_rule(1),
      Rule::style(vec![Selector::tag("span")], decl(2)),
      div_rule(3),
    ],
    None,
  );
  let element = note_div();
  let mut sink = Recorder::new();
  let loader = MapLoader::new(vec![]);

  apply(&sheet, &element, &mut sink, &loader, &MatchContext::new()).unwrap();
  assert_eq!(sink.applied, vec![decl(1), decl(3)]);
}

#[test]
fn each_matching_selector_reports_separately() {
  // One rule, two selectors that both match: the sink hears about each.
  let sheet = Stylesheet::new(
    vec![Rule::style(
      vec![
        Selector::tag("div"),
        Selector::condition(Condition::ClassContains("note".into())),
      ],
      decl(1),
    )],
    None,
  );
  let element = note_div();
  let mut sink = Recorder::new();
  let loader = MapLoader::new(vec![]);

  apply(&sheet, &element, &mut sink, &loader, &MatchContext::new()).unwrap();
  assert_eq!(sink.applied, vec![decl(1), decl(1)]);
}

#[test]
fn disabled_sheet_contributes_nothing() {
  let mut sheet = Stylesheet::new(vec![div_rule(1)], None);
  sheet.set_enabled(false);
  let element = note_div();
  let mut sink = Recorder::new();
  let loader = MapLoader::new(vec![]);

  apply(&sheet, &element, &mut sink, &loader, &MatchContext::new()).unwrap();
  assert!(sink.applied.is_empty());
}

#[test]
fn media_block_gates_on_viewport() {
  let narrow = MediaList::from(vec![
    MediaQuery::for_type("screen").with_feature("max-width", MediaFeatureValue::Px(600.0)),
  ]);
  let sheet = Stylesheet::new(vec![Rule::media(narrow, vec![div_rule(1)])], None);
  let element = note_div();
  let loader = MapLoader::new(vec![]);

  let mut sink = Recorder::new();
  let wide = MatchContext::new().with_media(MediaContext::screen(800.0, 600.0));
  apply(&sheet, &element, &mut sink, &loader, &wide).unwrap();
  assert!(sink.applied.is_empty());

  let mut sink = Recorder::new();
  let narrow_ctx = MatchContext::new().with_media(MediaContext::screen(400.0, 600.0));
  apply(&sheet, &element, &mut sink, &loader, &narrow_ctx).unwrap();
  assert_eq!(sink.applied, vec![decl(1)]);
}

#[test]
fn imports_resolve_relative_to_the_importing_sheet() {
  let sheet = Stylesheet::new(
    vec![Rule::import("theme/dark.css", MediaList::all())],
    Some("http://example.com/css/main.css".into()),
  );
  let loader = MapLoader::new(vec![(
    "http://example.com/css/theme/dark.css",
    vec![div_rule(7)],
  )]);
  let element = note_div();
  let mut sink = Recorder::new();

  apply(&sheet, &element, &mut sink, &loader, &MatchContext::new()).unwrap();
  assert_eq!(sink.applied, vec![decl(7)]);
}

#[test]
fn import_is_loaded_once_per_rule_instance() {
  let sheet = Stylesheet::new(
    vec![Rule::import("b.css", MediaList::all())],
    Some("http://x/a.css".into()),
  );
  let loader = MapLoader::new(vec![("http://x/b.css", vec![div_rule(1)])]);
  let element = note_div();

  for _ in 0..3 {
    let mut sink = Recorder::new();
    apply(&sheet, &element, &mut sink, &loader, &MatchContext::new()).unwrap();
    assert_eq!(sink.applied, vec![decl(1)]);
  }
  assert_eq!(loader.calls.get(), 1);
}

#[test]
fn media_gated_import_is_never_fetched() {
  let print_only = MediaList::from(vec![MediaQuery::for_type("print")]);
  let sheet = Stylesheet::new(
    vec![Rule::import("print.css", print_only), div_rule(2)],
    Some("http://x/a.css".into()),
  );
  let loader = MapLoader::new(vec![("http://x/print.css", vec![div_rule(1)])]);
  let element = note_div();
  let mut sink = Recorder::new();

  apply(&sheet, &element, &mut sink, &loader, &MatchContext::new()).unwrap();
  assert_eq!(sink.applied, vec![decl(2)]);
  assert_eq!(loader.calls.get(), 0);
}

#[test]
fn failed_import_degrades_to_empty() {
  let sheet = Stylesheet::new(
    vec![Rule::import("missing.css", MediaList::all()), div_rule(2)],
    Some("http://x/a.css".into()),
  );
  let loader = MapLoader::new(vec![]);
  let element = note_div();
  let mut sink = Recorder::new();

  // The 404 is swallowed and the rest of the sheet still applies.
  apply(&sheet, &element, &mut sink, &loader, &MatchContext::new()).unwrap();
  assert_eq!(sink.applied, vec![decl(2)]);
}

#[test]
fn internal_loader_failure_propagates() {
  let sheet = Stylesheet::new(
    vec![Rule::import("b.css", MediaList::all())],
    Some("http://x/a.css".into()),
  );
  let element = note_div();
  let mut sink = Recorder::new();

  let result = apply(&sheet, &element, &mut sink, &FailingLoader, &MatchContext::new());
  assert!(result.is_err());
}

#[test]
fn circular_imports_terminate() {
  // a.css imports b.css which imports a.css again.
  let sheet = Stylesheet::new(
    vec![Rule::import("b.css", MediaList::all()), div_rule(1)],
    Some("http://x/a.css".into()),
  );
  let loader = MapLoader::new(vec![
    (
      "http://x/b.css",
      vec![Rule::import("a.css", MediaList::all()), div_rule(2)],
    ),
    (
      "http://x/a.css",
      vec![Rule::import("b.css", MediaList::all()), div_rule(1)],
    ),
  ]);
  let element = note_div();
  let mut sink = Recorder::new();

  apply(&sheet, &element, &mut sink, &loader, &MatchContext::new()).unwrap();
  // b applies once, the re-import of a is skipped, a's own rule follows.
  assert_eq!(sink.applied, vec![decl(2), decl(1)]);
  // The circular a.css import is cut off before traversal.
  assert_eq!(loader.calls.get(), 2);
}

#[test]
fn diamond_import_applies_once() {
  // a imports b and c; both import d. d's rules apply only once.
  let sheet = Stylesheet::new(
    vec![
      Rule::import("b.css", MediaList::all()),
      Rule::import("c.css", MediaList::all()),
    ],
    Some("http://x/a.css".into()),
  );
  let loader = MapLoader::new(vec![
    ("http://x/b.css", vec![Rule::import("d.css", MediaList::all())]),
    ("http://x/c.css", vec![Rule::import("d.css", MediaList::all())]),
    ("http://x/d.css", vec![div_rule(4)]),
  ]);
  let element = note_div();
  let mut sink = Recorder::new();

  apply(&sheet, &element, &mut sink, &loader, &MatchContext::new()).unwrap();
  assert_eq!(sink.applied, vec![decl(4)]);
}

#[test]
fn rule_with_faulting_selector_is_skipped() {
  // :not() without a parser in context faults; only that rule is lost.
  let sheet = Stylesheet::new(
    vec![
      Rule::style(
        vec![Selector::condition(Condition::pseudo_with_args("not", "p"))],
        decl(1),
      ),
      div_rule(2),
    ],
    None,
  );
  let element = note_div();
  let mut sink = Recorder::new();
  let loader = MapLoader::new(vec![]);

  apply(&sheet, &element, &mut sink, &loader, &MatchContext::new()).unwrap();
  assert_eq!(sink.applied, vec![decl(2)]);
}
