//! Helper utilities for query building.
//!
//! Common functions used across report builders to reduce boilerplate
//! and ensure consistent formatting.

use super::SqlFragment;
use crate::db::quote_identifier;

/// Format a list of field names as a comma-separated string.
///
/// Used for SELECT, GROUP BY and ORDER BY clauses.
pub fn format_fields(fields: &[&str]) -> String {
    fields.join(", ")
}

/// Format `(expression, alias)` pairs as a select list with quoted aliases.
///
/// Quoting keeps mixed-case aliases such as `Osm_id` intact, which unquoted
/// PostgreSQL identifiers would fold to lower case.
pub fn format_aliased(columns: &[(&str, &str)]) -> String {
    columns
        .iter()
        .map(|(expr, alias)| format!("{} AS {}", expr, quote_identifier(alias)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Wrap a body statement in a chain of named common table expressions.
///
/// CTEs are emitted in the given order, so later ones may reference earlier
/// ones, and their bound values precede those of the body.
pub fn with_ctes(ctes: Vec<(&str, SqlFragment)>, body: SqlFragment) -> SqlFragment {
    if ctes.is_empty() {
        return body;
    }
    let mut query = SqlFragment::sql("WITH ");
    for (index, (name, cte)) in ctes.into_iter().enumerate() {
        if index > 0 {
            query.push_sql(",\n");
        }
        query.push_sql(name).push_sql(" AS (\n").push(cte).push_sql("\n)");
    }
    query.push_sql("\n").push(body);
    query
}

/// A `WHERE` clause on its own line. Empty conditions produce no clause.
pub fn where_clause(condition: SqlFragment) -> SqlFragment {
    if condition.is_empty() {
        return SqlFragment::new();
    }
    let mut clause = SqlFragment::sql("\nWHERE ");
    clause.push(condition);
    clause
}
