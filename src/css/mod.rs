//! CSS rule and selector types
//!
//! The data side of the engine: the selector/condition AST, stylesheet and
//! rule containers, and the loader boundary for `@import` resolution.

pub mod loader;
pub mod selectors;
pub mod types;

pub use loader::{LoadError, StylesheetLoader};
pub use selectors::{Condition, Selector, SelectorParser};
pub use types::{
  DeclarationBlockRef, ImportKey, MediaFeatureValue, MediaList, MediaQuery, Rule, Stylesheet,
};
