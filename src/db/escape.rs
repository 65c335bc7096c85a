//! String escaping utilities for PostgreSQL statements.
//!
//! Literal escaping is only used by the inline binder. Identifier quoting is
//! used for internal table and column names that never come from a request.

/// Escape a string for use inside a single-quoted PostgreSQL literal.
///
/// Assumes `standard_conforming_strings = on` (the server default), so only
/// the quote character itself needs doubling. Returns `None` when the string
/// contains a NUL byte, which PostgreSQL text values cannot hold.
pub fn escape_literal(s: &str) -> Option<String> {
    if s.contains('\0') {
        return None;
    }
    let mut result = String::with_capacity(s.len() + 2);
    result.push('\'');
    for c in s.chars() {
        if c == '\'' {
            result.push('\'');
        }
        result.push(c);
    }
    result.push('\'');
    Some(result)
}

/// Quote an identifier (table, column, schema or alias name).
#[inline]
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Escape the LIKE metacharacters of a term so that it only matches literally.
///
/// Uses backslash, the default LIKE escape character.
pub fn escape_like(term: &str) -> String {
    let mut result = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}
