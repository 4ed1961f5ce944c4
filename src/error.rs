//! Error types for stylecast
//!
//! Two kinds of failure cross this crate's boundary:
//! - CSS syntax faults raised while validating caller-supplied selector
//!   lists or while re-parsing `:not()` arguments at match time. These are
//!   always surfaced, never swallowed.
//! - Stylesheet load failures from `@import` resolution. HTTP/IO failures
//!   degrade to an empty stylesheet inside the cascade walker; anything
//!   else propagates through this type.
//!
//! All errors use the `thiserror` crate for minimal boilerplate and proper
//! error trait implementations. Recoverable data-integrity issues (unknown
//! selector kinds, unparsable media feature values) are not errors at all:
//! they are logged and evaluated as `false`.

use crate::css::loader::LoadError;
use thiserror::Error;

/// Result type alias for stylecast operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for stylecast
#[derive(Error, Debug)]
pub enum Error {
  /// Malformed selector or pseudo-class input supplied by the caller
  #[error("CSS syntax error: {0}")]
  Syntax(#[from] CssSyntaxError),

  /// Unexpected stylesheet load failure that must not be papered over
  #[error("stylesheet load error: {0}")]
  Load(#[from] LoadError),
}

/// A CSS syntax fault
///
/// Raised by the selector validator and by `:not()` argument parsing. A
/// fault anywhere aborts validation of the whole selector list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CssSyntaxError {
  /// A selector failed whitelist validation
  #[error("invalid selector: {0}")]
  InvalidSelector(String),

  /// A `:not()` argument did not parse to exactly one selector
  #[error("invalid :not() argument: {0}")]
  InvalidNotArgument(String),

  /// CSS3 pseudo-class used on a detached, childless node while the
  /// attached-node browser feature is in force
  #[error("syntax error")]
  DetachedPseudoClass,

  /// Free-form parse failure reported by the external selector parser
  #[error("{0}")]
  Parse(String),
}
