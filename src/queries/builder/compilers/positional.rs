//! Positional parameter binder.
//!
//! Implements `Binder` for executors such as `postgres::Client::query`, which
//! take `$n` placeholders and a parameter slice.

use super::Binder;
use crate::db::BindValue;
use crate::queries::ComposeError;

#[derive(Debug, Clone, Copy)]
pub struct PositionalBinder;

impl Binder for PositionalBinder {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn placeholder(&self, position: usize, _value: &BindValue) -> Result<String, ComposeError> {
        Ok(format!("${}", position))
    }

    fn retains_binds(&self) -> bool {
        true
    }
}
