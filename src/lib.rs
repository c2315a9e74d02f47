//! # Ferrule
//!
//! Oniguruma-style regular expressions in pure Rust: compile a pattern
//! once, then run anchored matches and forward or backward searches
//! against byte buffers, reading captures by index or by name.
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrule::prelude::*;
//!
//! let re = Regex::new(r"(?<year>\d{4})-(?<month>\d{2})").unwrap();
//! let caps = re.captures("Date: 2026-02-12").unwrap();
//! assert_eq!(caps.name("year").unwrap().as_str(), Some("2026"));
//! assert_eq!(caps.span(0), Some(Span::new(6, 13)));
//! ```
//!
//! For fine-grained control, use [`RegexBuilder`](api::RegexBuilder):
//!
//! ```rust
//! use ferrule::prelude::*;
//!
//! let re = Regex::builder(r"hello")
//!     .case_insensitive(true)
//!     .syntax(Syntax::Perl)
//!     .build()
//!     .unwrap();
//! assert!(re.is_match("Hello World"));
//! ```
//!
//! ## Engine-Level API
//!
//! The Oniguruma-shaped calls are available directly:
//!
//! ```rust
//! use ferrule::oniguruma::*;
//! use ferrule::regcomp::onig_new;
//! use ferrule::regexec::onig_search;
//! use ferrule::regsyntax::OnigSyntaxRuby;
//!
//! let reg = onig_new(
//!     b"a+",
//!     ONIG_OPTION_NONE,
//!     &ferrule::encodings::ONIG_ENCODING_UTF8,
//!     &OnigSyntaxRuby,
//! ).unwrap();
//!
//! let mut region = onig_region_new();
//! let start = onig_search(&reg, b"baaab", SearchDirection::Forward, &mut region, ONIG_OPTION_NONE);
//! assert_eq!(start, Ok(Some(1)));
//! assert_eq!(region.span(0), Some((1, 4)));
//! ```
//!
//! ## Module Structure
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`regparse`] | Pattern parser |
//! | [`regcomp`] | Tree-to-bytecode compiler |
//! | [`regexec`] | VM executor, search and name queries |
//! | [`regint`] | Program representation |
//! | [`oniguruma`] | Public types, options, error codes, regions |
//! | [`regenc`] | Encoding trait |
//! | [`regsyntax`] | 12 syntax definitions |
//! | [`unicode`] | Unicode code range tables |
//! | [`regerror`] | Error messages |
//! | [`engine`] | Engine trait behind the idiomatic API |

#![allow(clippy::len_without_is_empty)]
#![allow(non_upper_case_globals)]

pub mod api;
pub mod encodings;
pub mod engine;
pub mod error;
pub mod oniguruma;
pub mod prelude;
pub mod regcomp;
pub mod regenc;
pub mod regerror;
pub mod regexec;
pub mod regint;
pub mod regparse;
pub mod regparse_types;
pub mod regsyntax;
pub mod unicode;
