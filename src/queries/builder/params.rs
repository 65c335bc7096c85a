//! Parameter binding helpers for query building.
//!
//! A [`SqlFragment`] keeps structural SQL text and the literal values it
//! binds side by side. Every bound value leaves one [`MARKER`] in the text,
//! and fragments only grow by appending, so markers and values always stay
//! in the same order.

use crate::db::BindValue;

/// Placeholder left in fragment text for each bound value.
pub const MARKER: &str = "$?";

/// A piece of SQL text plus the values it binds, in marker order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlFragment {
    sql: String,
    binds: Vec<BindValue>,
}

impl SqlFragment {
    /// Create a new, empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fragment from structural text with no bound values.
    ///
    /// The text must come from the crate itself, never from a request.
    pub fn sql(text: impl Into<String>) -> Self {
        Self {
            sql: text.into(),
            binds: Vec::new(),
        }
    }

    /// Append structural text.
    pub fn push_sql(&mut self, text: &str) -> &mut Self {
        self.sql.push_str(text);
        self
    }

    /// Append a placeholder and its value.
    pub fn push_bind(&mut self, value: impl Into<BindValue>) -> &mut Self {
        self.sql.push_str(MARKER);
        self.binds.push(value.into());
        self
    }

    /// Append another fragment, text and values together.
    pub fn push(&mut self, other: SqlFragment) -> &mut Self {
        self.sql.push_str(&other.sql);
        self.binds.extend(other.binds);
        self
    }

    /// Wrap the fragment in parentheses. Empty fragments stay empty.
    pub fn parenthesized(self) -> Self {
        if self.is_empty() {
            return self;
        }
        Self {
            sql: format!("({})", self.sql),
            binds: self.binds,
        }
    }

    /// Join non-empty fragments with a separator, skipping empty ones.
    pub fn join(parts: impl IntoIterator<Item = SqlFragment>, separator: &str) -> SqlFragment {
        let mut joined = SqlFragment::new();
        for part in parts.into_iter().filter(|p| !p.is_empty()) {
            if !joined.is_empty() {
                joined.push_sql(separator);
            }
            joined.push(part);
        }
        joined
    }

    /// True when the fragment has no text.
    pub fn is_empty(&self) -> bool {
        self.sql.trim().is_empty()
    }

    pub fn text(&self) -> &str {
        &self.sql
    }

    pub fn binds(&self) -> &[BindValue] {
        &self.binds
    }

    /// Number of placeholder markers in the text.
    pub fn marker_count(&self) -> usize {
        self.sql.matches(MARKER).count()
    }

    pub fn into_parts(self) -> (String, Vec<BindValue>) {
        (self.sql, self.binds)
    }
}
