//! # Pattern Module
//!
//! Compiles route templates into a matcher/generator pair.
//!
//! ## Template syntax
//!
//! | Syntax     | Meaning                                                     |
//! |------------|-------------------------------------------------------------|
//! | `/books`   | literal text                                                |
//! | `:id`      | named capture, one or more characters other than `/`        |
//! | `*path`    | glob capture, zero or more characters including `/`, greedy |
//! | `( ... )`  | optional group, may nest                                    |
//! | `\(`       | escaped character, taken literally                          |
//!
//! A [`ConstraintSet`] replaces the default rule of individual captures, for
//! example restricting `:id` to digits.
//!
//! ## Example
//!
//! ```rust
//! use switchyard::pattern::{Constraint, ConstraintSet, PathPattern, RouteArgs};
//!
//! let constraints = ConstraintSet::new().with("id", Constraint::digits());
//! let pattern = PathPattern::compile("/books/:id(.:format)", &constraints).unwrap();
//!
//! let params = pattern.match_path("/books/23.json").unwrap();
//! assert_eq!(params[0].1, "23");
//! assert_eq!(params[1].1, "json");
//! assert!(pattern.match_path("/books/abc").is_none());
//!
//! let path = pattern.generate(&RouteArgs::keyed([("id", "7"), ("page", "2")])).unwrap();
//! assert_eq!(path, "/books/7?page=2");
//! ```
//!
//! ## Performance
//!
//! Templates with no captures and no optional groups are "fixed" and match by
//! string equality. All others compile to an anchored regex. A path with
//! percent escapes is matched with default rules only, and its decoded
//! captures are then checked against their constraints.

mod constraint;
mod core;

pub use constraint::{Constraint, ConstraintSet, DefaultRule};
pub use core::{ParamVec, PathPattern, RouteArgs, Token, MAX_INLINE_PARAMS};
