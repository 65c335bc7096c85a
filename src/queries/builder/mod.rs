//! Query building infrastructure.
//!
//! The query building system has three layers:
//!
//! 1. **Query Definition** - `QueryBuilder` implementations assemble a
//!    [`SqlFragment`] from request parameters
//! 2. **Binding** - a [`Binder`] turns placeholder markers into the
//!    executor's contract (positional `$n` or inline literals)
//! 3. **Execution** - the resulting [`ComposedQuery`] is handed to an
//!    external executor; nothing here opens a connection
//!
//! # Example
//!
//! ```ignore
//! let builder = TrainingQueryBuilder { params: &params };
//! let composed = ComposedQuery::from_builder(&builder, &PositionalBinder)?;
//! client.query(&composed.sql, &composed.sql_params())?;
//! ```

pub mod compilers;
pub mod helpers;
pub mod params;

use postgres::types::ToSql;
use serde::Serialize;

use crate::db::BindValue;
use crate::queries::ComposeError;

pub use compilers::{get_binder, Binder, BindingStyle, InlineBinder, PositionalBinder};
pub use params::{SqlFragment, MARKER};

/// Definition of a single statement.
pub trait QueryBuilder {
    /// Assemble the statement as a fragment with unresolved markers.
    fn build(&self) -> Result<SqlFragment, ComposeError>;
}

/// A statement ready for execution.
///
/// With a positional binder `binds` holds one value per `$n`; with an inline
/// binder the values are already part of `sql` and `binds` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

impl ComposedQuery {
    /// Build and bind a statement in one step.
    pub fn from_builder(builder: &dyn QueryBuilder, binder: &dyn Binder) -> Result<Self, ComposeError> {
        bind(builder.build()?, binder)
    }

    /// Bound values as `postgres` parameters, in placeholder order.
    pub fn sql_params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.binds.iter().map(BindValue::as_sql_param).collect()
    }

    /// Get the number of parameters in this query.
    pub fn param_count(&self) -> usize {
        self.binds.len()
    }
}

/// Resolve every marker of a fragment with the given binder.
pub fn bind(fragment: SqlFragment, binder: &dyn Binder) -> Result<ComposedQuery, ComposeError> {
    let markers = fragment.marker_count();
    let (sql, binds) = fragment.into_parts();
    if markers != binds.len() {
        return Err(ComposeError::PlaceholderMismatch {
            markers,
            binds: binds.len(),
        });
    }

    let mut out = String::with_capacity(sql.len() + binds.len() * 4);
    let mut rest = sql.as_str();
    for (index, value) in binds.iter().enumerate() {
        // Marker count was checked above, so every value has a marker.
        let Some(at) = rest.find(MARKER) else { break };
        out.push_str(&rest[..at]);
        out.push_str(&binder.placeholder(index + 1, value)?);
        rest = &rest[at + MARKER.len()..];
    }
    out.push_str(rest);

    let binds = if binder.retains_binds() { binds } else { Vec::new() };
    Ok(ComposedQuery { sql: out, binds })
}
