//! Value and escaping primitives shared by the query builders.
//!
//! Nothing in here talks to a server. The composed statements are handed to
//! an external executor, which is why literal values are kept as typed
//! [`BindValue`]s that convert into `postgres` parameters.
//!
//! # Type Decisions
//!
//! **Why `i64` for project and user ids?**
//! PostgreSQL `bigint` maps to `i64` in the `postgres` crate, and the ids
//! arrive already validated.
//!
//! **Why `NaiveDateTime` instead of `DateTime<Utc>`?**
//! The edit-history columns are `timestamp without time zone`.

mod escape;
mod value;

pub use escape::{escape_like, escape_literal, quote_identifier};
pub use value::BindValue;
