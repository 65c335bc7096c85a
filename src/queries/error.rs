use thiserror::Error;

use super::report::ReportShape;

/// Errors raised while composing a report statement.
///
/// Parameter errors name the report family and the offending dimension so
/// the caller can correct its request. `PlaceholderMismatch` signals a bug in
/// a builder, never bad input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComposeError {
    #[error("{report}: required filter '{dimension}' is missing or empty")]
    MissingDimension {
        report: ReportShape,
        dimension: &'static str,
    },

    #[error("{report}: invalid parameter '{field}': {message}")]
    InvalidParameter {
        report: ReportShape,
        field: &'static str,
        message: String,
    },

    #[error("Unsupported report family: {name}")]
    UnsupportedReport { name: String },

    #[error("Composition invariant violated: {markers} placeholder(s) for {binds} bound value(s)")]
    PlaceholderMismatch { markers: usize, binds: usize },

    #[error("Value cannot be rendered as a literal: {message}")]
    UnrepresentableLiteral { message: String },
}
