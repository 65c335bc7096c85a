//! Inline literal binder.
//!
//! Implements `Binder` for executors that accept one finished statement.
//! Values are rendered through `BindValue::to_literal`, never by formatting
//! request text directly.

use super::Binder;
use crate::db::BindValue;
use crate::queries::ComposeError;

#[derive(Debug, Clone, Copy)]
pub struct InlineBinder;

impl Binder for InlineBinder {
    fn name(&self) -> &'static str {
        "inline"
    }

    fn placeholder(&self, position: usize, value: &BindValue) -> Result<String, ComposeError> {
        value.to_literal().ok_or_else(|| ComposeError::UnrepresentableLiteral {
            message: format!("{} value at position {} contains a NUL byte", value.type_name(), position),
        })
    }

    fn retains_binds(&self) -> bool {
        false
    }
}
