//! Report composition: predicates, their combination, and one assembler per
//! report family.
//!
//! ```ignore
//! let request: ReportRequest = serde_json::from_str(json)?;
//! let report = compose(&request, &ComposeOptions::default(), &PositionalBinder)?;
//! for statement in &report.statements {
//!     client.query(&statement.query.sql, &statement.query.sql_params())?;
//! }
//! ```

pub mod builder;
pub mod combinator;
pub mod data_quality;
pub mod error;
pub mod mapathon;
pub mod predicate;
pub mod report;
pub mod training;
pub mod user_stats;

pub use error::ComposeError;
pub use report::{
    compose, AssembleReport, ComposeOptions, ComposedReport, ReportRequest, ReportShape,
    Statement, StatementShape,
};
