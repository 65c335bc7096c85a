//! Data-quality issue reports over the `validation` table.

use chrono::NaiveDateTime;

use crate::queries::builder::helpers::{format_aliased, where_clause, with_ctes};
use crate::queries::builder::{QueryBuilder, SqlFragment};
use crate::queries::combinator::{all_of, any_of, require_non_empty, require_window};
use crate::queries::predicate::{contained_in, in_list, project_terms, timestamp_between, Predicate};
use crate::queries::report::{AssembleReport, ComposeOptions, ReportShape};
use crate::queries::ComposeError;
use crate::types::{
    expand_issue_types, DataQualityHashtagParams, DataQualityProjectParams,
    DataQualityUsernameParams, IssueType, Polygon,
};

/// Columns of one validation row, with aliases clients read back verbatim.
const ISSUE_COLUMNS: [(&str, &str); 4] = [
    ("osm_id", "Osm_id"),
    ("change_id", "Changeset_id"),
    ("timestamp::text", "Changeset_timestamp"),
    ("status::text", "Issue_type"),
];

const LOCATION_COLUMNS: [(&str, &str); 2] = [
    ("ST_X(location::geometry)", "lng"),
    ("ST_Y(location::geometry)", "lat"),
];

/// Status values for the requested issue kinds. At least one kind is required.
fn issue_statuses(report: ReportShape, issue_types: &[IssueType]) -> Result<Vec<String>, ComposeError> {
    require_non_empty(report, "issue_types", issue_types)?;
    Ok(expand_issue_types(issue_types)
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// `status` is an enum array; comparing as text keeps every bind a text value.
fn status_filter(statuses: &[String]) -> SqlFragment {
    any_of(statuses.iter().map(|status| {
        let mut fragment = SqlFragment::new();
        fragment.push_bind(status.as_str()).push_sql(" = ANY(\"status\"::text[])");
        fragment
    }))
}

/// Containment of `location` in the request polygon, or nothing without one.
fn geometry_filter(report: ReportShape, geometry: Option<&Polygon>) -> Result<SqlFragment, ComposeError> {
    let Some(polygon) = geometry else {
        return Ok(SqlFragment::new());
    };
    let invalid = |message: String| ComposeError::InvalidParameter {
        report,
        field: "geometry",
        message,
    };
    polygon.validate().map_err(invalid)?;
    let geojson = polygon.to_geojson().map_err(|e| invalid(e.to_string()))?;
    Ok(contained_in(geojson, "location"))
}

fn issue_select(with_username: bool) -> String {
    let mut columns = format_aliased(&ISSUE_COLUMNS);
    if with_username {
        columns.push_str(", ");
        columns.push_str(&format_aliased(&[("T1.username", "username")]));
    }
    columns.push_str(", ");
    columns.push_str(&format_aliased(&LOCATION_COLUMNS));
    columns
}

/// Issues on changesets of Tasking Manager projects.
#[derive(Debug)]
pub struct ProjectIssuesQueryBuilder<'a> {
    pub params: &'a DataQualityProjectParams,
    pub options: &'a ComposeOptions,
}

impl QueryBuilder for ProjectIssuesQueryBuilder<'_> {
    fn build(&self) -> Result<SqlFragment, ComposeError> {
        let report = ReportShape::DataQualityByProject;
        require_non_empty(report, "project_ids", &self.params.project_ids)?;
        let statuses = issue_statuses(report, &self.params.issue_types)?;
        let geometry = geometry_filter(report, self.params.geometry.as_ref())?;

        let terms = project_terms(&self.options.project_hashtag_prefix, &self.params.project_ids);
        let mut changesets = SqlFragment::sql("SELECT id\nFROM changesets");
        changesets.push(where_clause(
            Predicate::ArrayContains { column: "hashtags", values: &terms }.build(),
        ));

        let mut issues = SqlFragment::sql(format!(
            "SELECT {}\nFROM validation\nJOIN T1 ON validation.change_id = T1.id",
            issue_select(false)
        ));
        issues.push(where_clause(all_of([status_filter(&statuses), geometry])));

        Ok(with_ctes(
            vec![("T1", changesets), ("T2", issues)],
            SqlFragment::sql("SELECT *\nFROM T2"),
        ))
    }
}

/// Issues on edits by a set of OSM users within a time window.
#[derive(Debug)]
pub struct UsernameIssuesQueryBuilder<'a> {
    pub params: &'a DataQualityUsernameParams,
}

impl QueryBuilder for UsernameIssuesQueryBuilder<'_> {
    fn build(&self) -> Result<SqlFragment, ComposeError> {
        let report = ReportShape::DataQualityByUsername;
        let params = self.params;
        require_non_empty(report, "osm_usernames", &params.osm_usernames)?;
        let statuses = issue_statuses(report, &params.issue_types)?;
        require_window(report, params.from_timestamp, params.to_timestamp)?;
        let geometry = geometry_filter(report, params.geometry.as_ref())?;

        let mut users = SqlFragment::sql("SELECT id, username\nFROM users");
        users.push(where_clause(
            Predicate::ExactMatch { column: "username", values: &params.osm_usernames }.build(),
        ));

        let mut issues = SqlFragment::sql(format!(
            "SELECT {}\nFROM validation\nJOIN T1 ON validation.user_id = T1.id",
            issue_select(true)
        ));
        issues.push(where_clause(all_of([
            status_filter(&statuses),
            timestamp_between("timestamp", params.from_timestamp, params.to_timestamp),
            geometry,
        ])));

        Ok(with_ctes(
            vec![("T1", users), ("T2", issues)],
            SqlFragment::sql("SELECT *\nFROM T2\nORDER BY username"),
        ))
    }
}

/// Issues aggregated per object on changesets carrying hashtags.
///
/// Statuses and hashtags are unnested, so one object with several issue kinds
/// collapses into one row whose `issues` lists them comma-separated.
#[derive(Debug)]
pub struct HashtagIssuesQueryBuilder<'a> {
    pub params: &'a DataQualityHashtagParams,
}

impl HashtagIssuesQueryBuilder<'_> {
    fn window(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.params.from_timestamp, self.params.to_timestamp)
    }
}

impl QueryBuilder for HashtagIssuesQueryBuilder<'_> {
    fn build(&self) -> Result<SqlFragment, ComposeError> {
        let report = ReportShape::DataQualityByHashtag;
        let params = self.params;
        let statuses = issue_statuses(report, &params.issue_types)?;
        let (from, to) = self.window();
        require_window(report, from, to)?;

        let mut validation = SqlFragment::sql(
            "SELECT osm_id, change_id, ST_Y(location::geometry) AS lat, ST_X(location::geometry) AS lng, \
             unnest(status)::text AS unnest_status\nFROM validation",
        );
        validation.push(where_clause(geometry_filter(report, params.geometry.as_ref())?));

        let mut changesets =
            SqlFragment::sql("SELECT id, created_at, unnest(hashtags) AS unnest_hashtags\nFROM changesets");
        changesets.push(where_clause(timestamp_between("created_at", from, to)));

        let mut body = SqlFragment::sql(
            "SELECT T1.osm_id, T1.change_id AS changeset_id, T1.lat, T1.lng, T2.created_at, \
             ARRAY_TO_STRING(ARRAY_AGG(T1.unnest_status), ',') AS issues\nFROM T1, T2",
        );
        body.push(where_clause(all_of([
            SqlFragment::sql("T1.change_id = T2.id"),
            in_list("unnest_hashtags", params.hashtags.iter().map(String::as_str)),
            in_list("unnest_status", statuses),
        ])))
        .push_sql("\nGROUP BY T1.osm_id, T1.lat, T1.lng, T2.created_at, T1.change_id");

        Ok(with_ctes(vec![("T1", validation), ("T2", changesets)], body))
    }
}

impl AssembleReport for DataQualityProjectParams {
    fn shape(&self) -> ReportShape {
        ReportShape::DataQualityByProject
    }

    fn assemble(&self, options: &ComposeOptions) -> Result<Vec<(&'static str, SqlFragment)>, ComposeError> {
        let builder = ProjectIssuesQueryBuilder { params: self, options };
        Ok(vec![("issues", builder.build()?)])
    }
}

impl AssembleReport for DataQualityUsernameParams {
    fn shape(&self) -> ReportShape {
        ReportShape::DataQualityByUsername
    }

    fn assemble(&self, _options: &ComposeOptions) -> Result<Vec<(&'static str, SqlFragment)>, ComposeError> {
        Ok(vec![("issues", UsernameIssuesQueryBuilder { params: self }.build()?)])
    }
}

impl AssembleReport for DataQualityHashtagParams {
    fn shape(&self) -> ReportShape {
        ReportShape::DataQualityByHashtag
    }

    fn assemble(&self, _options: &ComposeOptions) -> Result<Vec<(&'static str, SqlFragment)>, ComposeError> {
        Ok(vec![("issues", HashtagIssuesQueryBuilder { params: self }.build()?)])
    }
}
