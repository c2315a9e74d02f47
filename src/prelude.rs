// prelude.rs - Convenient re-exports for the idiomatic API.
//
//! # Prelude
//!
//! ```
//! use ferrule::prelude::*;
//!
//! let re = Regex::new(r"\d+").unwrap();
//! let m = re.find("answer: 42").unwrap();
//! assert_eq!(m.as_str(), Some("42"));
//! ```

pub use crate::api::{Captures, CapturesIter, FindIter, Match, Regex, RegexBuilder, Span, Syntax};
pub use crate::engine::{Oniguruma, RegexEngine};
pub use crate::error::{ErrorClass, RegexError};
