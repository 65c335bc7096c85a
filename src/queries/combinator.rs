//! Boolean combination of predicate fragments.
//!
//! Alternatives of one dimension are OR-joined as they are; independent
//! dimensions are AND-joined with each operand parenthesized. Empty operands
//! are dropped in both cases so an absent optional filter never leaves `()`
//! behind.

use chrono::NaiveDateTime;

use crate::queries::builder::SqlFragment;
use crate::queries::report::ReportShape;
use crate::queries::ComposeError;

/// OR-join alternatives, skipping empty ones.
///
/// Operands are not wrapped, so callers pass alternatives that are already
/// atomic or parenthesized. The result has one top-level alternative per
/// non-empty operand.
pub fn any_of(alternatives: impl IntoIterator<Item = SqlFragment>) -> SqlFragment {
    SqlFragment::join(alternatives, " OR ")
}

/// AND-join independent conditions, parenthesizing each non-empty one.
///
/// Returns an empty fragment when every condition is empty; callers then emit
/// no `WHERE` clause at all.
pub fn all_of(conditions: impl IntoIterator<Item = SqlFragment>) -> SqlFragment {
    SqlFragment::join(
        conditions
            .into_iter()
            .filter(|c| !c.is_empty())
            .map(SqlFragment::parenthesized),
        " AND ",
    )
}

/// Combine the hashtag and project attribution filters of a mapathon report.
///
/// Either one alone is used as is, both are OR-combined (a changeset
/// matching either signal counts). With neither the request is rejected,
/// since an unconstrained filter would select every changeset in the window.
pub fn either_attribution(
    report: ReportShape,
    hashtags: SqlFragment,
    projects: SqlFragment,
) -> Result<SqlFragment, ComposeError> {
    if hashtags.is_empty() && projects.is_empty() {
        return Err(ComposeError::MissingDimension {
            report,
            dimension: "hashtags or project_ids",
        });
    }
    Ok(any_of([hashtags, projects]))
}

/// Reject an empty required collection.
pub fn require_non_empty<T>(
    report: ReportShape,
    dimension: &'static str,
    values: &[T],
) -> Result<(), ComposeError> {
    if values.is_empty() {
        return Err(ComposeError::MissingDimension { report, dimension });
    }
    Ok(())
}

/// Reject a time window whose start is after its end.
pub fn require_window(
    report: ReportShape,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Result<(), ComposeError> {
    if from > to {
        return Err(ComposeError::InvalidParameter {
            report,
            field: "from_timestamp",
            message: format!("{} is after to_timestamp {}", from, to),
        });
    }
    Ok(())
}
