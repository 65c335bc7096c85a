//! Execution-contract specific binding.
//!
//! The same composed fragment can be handed to an executor that takes
//! positional parameters or to one that only accepts a finished statement.
//! A [`Binder`] encapsulates that difference.

pub mod inline;
pub mod positional;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::db::BindValue;
use crate::queries::ComposeError;

pub use inline::InlineBinder;
pub use positional::PositionalBinder;

/// Trait for turning placeholder markers into executable SQL.
pub trait Binder {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Render the placeholder for the value at 1-based `position`.
    fn placeholder(&self, position: usize, value: &BindValue) -> Result<String, ComposeError>;

    /// Whether bound values travel next to the statement text.
    fn retains_binds(&self) -> bool;
}

/// How literal values reach the executor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingStyle {
    /// `$1, $2, ...` placeholders plus an ordered bind list
    #[default]
    Positional,
    /// Escaped literals rendered into a single statement
    Inline,
}

/// Get the binder for a binding style.
pub fn get_binder(style: BindingStyle) -> Box<dyn Binder> {
    match style {
        BindingStyle::Positional => Box::new(PositionalBinder),
        BindingStyle::Inline => Box::new(InlineBinder),
    }
}
