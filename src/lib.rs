//! CSS selector matching and cascade engine
//!
//! Matches parsed CSS selectors against a live DOM and walks stylesheets
//! to report which declaration blocks apply to an element. The crate owns
//! neither side of the problem: CSS text comes in pre-parsed as a
//! [`Stylesheet`] AST, the DOM is borrowed through the capability traits
//! in [`dom`], and matching results go out through a [`StyleSink`].
//!
//! ```
//! use stylecast::css::selectors::{Condition, Selector};
//! use stylecast::dom::TreeNode;
//! use stylecast::style::{matches, MatchContext};
//!
//! let doc = TreeNode::document();
//! let html = TreeNode::element("html");
//! let div = TreeNode::element("div").attr("class", "note");
//! html.append(div.clone());
//! doc.append(html);
//!
//! let selector = Selector::compound(
//!   Selector::tag("div"),
//!   Condition::ClassContains("note".into()),
//! );
//! let element = div.to_element().unwrap();
//! assert!(matches(&selector, &element, &MatchContext::new()).unwrap());
//! ```

pub mod css;
pub mod dom;
pub mod error;
pub mod style;

pub use css::loader::{LoadError, StylesheetLoader};
pub use css::selectors::{Condition, Selector, SelectorParser};
pub use css::types::{DeclarationBlockRef, MediaList, Rule, Stylesheet};
pub use error::{CssSyntaxError, Error, Result};
pub use style::{
  apply, matches, validate_selectors, BrowserFeatures, MatchContext, MediaContext, StyleSink,
};
