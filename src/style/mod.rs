//! Style resolution
//!
//! Selector matching, validation, media query evaluation and the cascade
//! walk over stylesheets.

pub mod cascade;
pub mod context;
pub mod matcher;
pub mod media;
pub mod validator;

pub use cascade::{apply, StyleSink};
pub use context::{BrowserFeatures, MatchContext};
pub use matcher::{eval_pseudo, matches, matches_condition};
pub use media::{is_active, MediaContext};
pub use validator::validate_selectors;
