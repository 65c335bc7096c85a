//! Mapathon summary and detail reports.
//!
//! Both reports select the attributed changesets once, as CTE `T1`, and
//! aggregate the edit history of those changesets downstream.

use chrono::NaiveDateTime;

use crate::db::quote_identifier;
use crate::queries::builder::helpers::{format_fields, where_clause, with_ctes};
use crate::queries::builder::{QueryBuilder, SqlFragment};
use crate::queries::combinator::{all_of, either_attribution, require_window};
use crate::queries::predicate::{attribution_filter, project_terms, timestamp_between, Predicate, HSTORE_COLUMN};
use crate::queries::report::{AssembleReport, ComposeOptions, ReportShape};
use crate::queries::ComposeError;
use crate::types::{DataSource, MapathonDetailParams, MapathonSummaryParams};

/// Selection of changesets attributed to hashtags/projects in a time window.
///
/// Compiles to `SELECT user_id, changeset_id, username FROM osm_changeset`
/// restricted by the window and the attribution filter.
#[derive(Debug, Clone, Copy)]
pub struct ChangesetQueryBuilder<'a> {
    pub report: ReportShape,
    pub project_ids: &'a [i64],
    pub hashtags: &'a [String],
    pub from_timestamp: NaiveDateTime,
    pub to_timestamp: NaiveDateTime,
    /// Restrict to changesets of one contributor
    pub user_id: Option<i64>,
    pub options: &'a ComposeOptions,
}

impl ChangesetQueryBuilder<'_> {
    /// The `WHERE` condition shared by the selection and contributor count.
    pub fn condition(&self) -> Result<SqlFragment, ComposeError> {
        require_window(self.report, self.from_timestamp, self.to_timestamp)?;
        let terms = project_terms(&self.options.project_hashtag_prefix, self.project_ids);
        let attribution = either_attribution(
            self.report,
            attribution_filter(self.hashtags),
            attribution_filter(&terms),
        )?;
        let mut user = SqlFragment::new();
        if let Some(user_id) = self.user_id {
            user.push_sql("\"user_id\" = ").push_bind(user_id);
        }
        Ok(all_of([
            timestamp_between("created_at", self.from_timestamp, self.to_timestamp),
            attribution,
            user,
        ]))
    }
}

impl QueryBuilder for ChangesetQueryBuilder<'_> {
    fn build(&self) -> Result<SqlFragment, ComposeError> {
        let mut query =
            SqlFragment::sql("SELECT user_id, id AS changeset_id, user_name AS username\nFROM osm_changeset");
        query.push(where_clause(self.condition()?));
        Ok(query)
    }
}

/// Per-feature, per-action counts of distinct edited objects.
///
/// Without usernames rows are ordered by volume; with usernames they are
/// grouped per user first.
#[derive(Debug, Clone, Copy)]
pub struct MappedFeaturesQueryBuilder<'a> {
    pub changesets: ChangesetQueryBuilder<'a>,
    pub with_username: bool,
}

impl QueryBuilder for MappedFeaturesQueryBuilder<'_> {
    fn build(&self) -> Result<SqlFragment, ComposeError> {
        let feature = format!("(each(osh.{})).key AS feature", quote_identifier(HSTORE_COLUMN));
        let mut columns = vec![feature.as_str(), "action", "count(distinct id) AS count"];
        let mut group_by = vec!["feature", "action"];
        let order_by: &[&str] = if self.with_username {
            columns.extend(["user_id", "username"]);
            group_by.extend(["user_id", "username"]);
            &["user_id", "action", "count"]
        } else {
            &["count DESC"]
        };

        let body = SqlFragment::sql(format!(
            "SELECT {}\nFROM osm_element_history AS osh, T1\nWHERE T1.changeset_id = osh.changeset\nGROUP BY {}\nORDER BY {}",
            format_fields(&columns),
            format_fields(&group_by),
            format_fields(order_by),
        ));
        Ok(with_ctes(vec![("T1", self.changesets.build()?)], body))
    }
}

/// Number of distinct contributors among the attributed changesets.
#[derive(Debug, Clone, Copy)]
pub struct TotalContributorsQueryBuilder<'a> {
    pub changesets: ChangesetQueryBuilder<'a>,
}

impl QueryBuilder for TotalContributorsQueryBuilder<'_> {
    fn build(&self) -> Result<SqlFragment, ComposeError> {
        let mut query =
            SqlFragment::sql("SELECT COUNT(distinct user_id) AS contributors_count\nFROM osm_changeset");
        query.push(where_clause(self.changesets.condition()?));
        Ok(query)
    }
}

/// Summary over the Underpass store, where hashtags are an array column and
/// per-changeset feature counters are kept in `added`/`modified` hstores.
#[derive(Debug, Clone, Copy)]
pub struct UnderpassSummaryQueryBuilder<'a> {
    pub params: &'a MapathonSummaryParams,
    pub options: &'a ComposeOptions,
}

impl UnderpassSummaryQueryBuilder<'_> {
    pub fn condition(&self) -> Result<SqlFragment, ComposeError> {
        let report = ReportShape::MapathonSummary;
        require_window(report, self.params.from_timestamp, self.params.to_timestamp)?;
        let terms = project_terms(&self.options.project_hashtag_prefix, &self.params.project_ids);
        let attribution = either_attribution(
            report,
            Predicate::ArrayContains { column: "hashtags", values: &self.params.hashtags }.build(),
            Predicate::ArrayContains { column: "hashtags", values: &terms }.build(),
        )?;
        Ok(all_of([
            timestamp_between("created_at", self.params.from_timestamp, self.params.to_timestamp),
            attribution,
        ]))
    }

    /// Contributor count over the same changesets.
    pub fn contributors(&self) -> Result<SqlFragment, ComposeError> {
        let mut query =
            SqlFragment::sql("SELECT COUNT(distinct user_id) AS contributors_count\nFROM changesets");
        query.push(where_clause(self.condition()?));
        Ok(query)
    }
}

impl QueryBuilder for UnderpassSummaryQueryBuilder<'_> {
    fn build(&self) -> Result<SqlFragment, ComposeError> {
        let mut changesets = SqlFragment::sql("SELECT *\nFROM changesets");
        changesets.push(where_clause(self.condition()?));

        let counters = SqlFragment::sql(
            "SELECT (each(added)).key AS feature, (each(added)).value::integer AS count, 'create'::text AS action\n\
             FROM T1\n\
             UNION ALL\n\
             SELECT (each(modified)).key AS feature, (each(modified)).value::integer AS count, 'modify'::text AS action\n\
             FROM T1",
        );
        let body = SqlFragment::sql(
            "SELECT feature, action, sum(count) AS count\nFROM T2\nGROUP BY feature, action\nORDER BY count DESC",
        );
        Ok(with_ctes(vec![("T1", changesets), ("T2", counters)], body))
    }
}

/// Per-user building totals joined with task and editor statistics.
///
/// `tasks_per_user` and `editors_per_user` are stored functions owned by the
/// database; only their names and argument order are relied on here.
#[derive(Debug, Clone, Copy)]
pub struct ContributorsQueryBuilder<'a> {
    pub changesets: ChangesetQueryBuilder<'a>,
}

impl QueryBuilder for ContributorsQueryBuilder<'_> {
    fn build(&self) -> Result<SqlFragment, ComposeError> {
        let changesets = &self.changesets;
        let schema = quote_identifier(&changesets.options.function_schema);
        let project_csv = changesets
            .project_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let per_feature = SqlFragment::sql(format!(
            "SELECT (each(osh.{})).key AS feature, user_id, username, count(distinct id) AS count\n\
             FROM osm_element_history AS osh, T1\n\
             WHERE T1.changeset_id = osh.changeset\n\
             GROUP BY feature, user_id, username",
            quote_identifier(HSTORE_COLUMN)
        ));
        let buildings = SqlFragment::sql(
            "SELECT user_id, username, SUM(count) AS total_buildings\n\
             FROM T2\n\
             WHERE feature = 'building'\n\
             GROUP BY user_id, username",
        );

        let mut body = SqlFragment::sql("SELECT user_id, username, total_buildings");
        for (status, alias) in [("MAPPED", "mapped_tasks"), ("VALIDATED", "validated_tasks")] {
            body.push_sql(&format!(",\n{}.tasks_per_user(user_id, ", schema))
                .push_bind(project_csv.as_str())
                .push_sql(", ")
                .push_bind(changesets.from_timestamp)
                .push_sql(", ")
                .push_bind(changesets.to_timestamp)
                .push_sql(&format!(", '{}') AS {}", status, alias));
        }
        body.push_sql(&format!(",\n{}.editors_per_user(user_id, ", schema))
            .push_bind(changesets.from_timestamp)
            .push_sql(", ")
            .push_bind(changesets.to_timestamp)
            .push_sql(") AS editors\nFROM T3");

        Ok(with_ctes(
            vec![("T1", changesets.build()?), ("T2", per_feature), ("T3", buildings)],
            body,
        ))
    }
}

impl AssembleReport for MapathonSummaryParams {
    fn shape(&self) -> ReportShape {
        ReportShape::MapathonSummary
    }

    fn assemble(&self, options: &ComposeOptions) -> Result<Vec<(&'static str, SqlFragment)>, ComposeError> {
        match self.source {
            DataSource::Insights => {
                let changesets = ChangesetQueryBuilder {
                    report: self.shape(),
                    project_ids: &self.project_ids,
                    hashtags: &self.hashtags,
                    from_timestamp: self.from_timestamp,
                    to_timestamp: self.to_timestamp,
                    user_id: None,
                    options,
                };
                let features = MappedFeaturesQueryBuilder { changesets, with_username: false };
                let contributors = TotalContributorsQueryBuilder { changesets };
                Ok(vec![
                    ("mapped_features", features.build()?),
                    ("total_contributors", contributors.build()?),
                ])
            }
            DataSource::Underpass => {
                let builder = UnderpassSummaryQueryBuilder { params: self, options };
                Ok(vec![
                    ("mapped_features", builder.build()?),
                    ("total_contributors", builder.contributors()?),
                ])
            }
        }
    }
}

impl AssembleReport for MapathonDetailParams {
    fn shape(&self) -> ReportShape {
        ReportShape::MapathonDetail
    }

    fn assemble(&self, options: &ComposeOptions) -> Result<Vec<(&'static str, SqlFragment)>, ComposeError> {
        let changesets = ChangesetQueryBuilder {
            report: self.shape(),
            project_ids: &self.project_ids,
            hashtags: &self.hashtags,
            from_timestamp: self.from_timestamp,
            to_timestamp: self.to_timestamp,
            user_id: None,
            options,
        };
        let features = MappedFeaturesQueryBuilder { changesets, with_username: true };
        let contributors = ContributorsQueryBuilder { changesets };
        Ok(vec![
            ("mapped_features", features.build()?),
            ("contributors", contributors.build()?),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::BindValue;
    use crate::queries::builder::{bind, InlineBinder, PositionalBinder};
    use rstest::{fixture, rstest};

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[fixture]
    fn summary() -> MapathonSummaryParams {
        MapathonSummaryParams {
            project_ids: vec![11224],
            hashtags: vec!["mapandchathour2021".to_string()],
            from_timestamp: ts("2021-08-27T09:00:00"),
            to_timestamp: ts("2021-08-27T11:00:00"),
            source: DataSource::Insights,
        }
    }

    #[fixture]
    fn detail() -> MapathonDetailParams {
        MapathonDetailParams {
            project_ids: vec![11224, 10042],
            hashtags: vec![],
            from_timestamp: ts("2021-08-27T09:00:00"),
            to_timestamp: ts("2021-08-27T11:00:00"),
        }
    }

    fn statement(parts: &[(&'static str, SqlFragment)], name: &str) -> SqlFragment {
        parts.iter().find(|(n, _)| *n == name).map(|(_, f)| f.clone()).unwrap()
    }

    #[rstest]
    fn test_summary_statements(summary: MapathonSummaryParams) {
        let parts = summary.assemble(&ComposeOptions::default()).unwrap();
        let names: Vec<&str> = parts.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["mapped_features", "total_contributors"]);
    }

    #[rstest]
    fn test_summary_mapped_features_shape(summary: MapathonSummaryParams) {
        let parts = summary.assemble(&ComposeOptions::default()).unwrap();
        let query = bind(statement(&parts, "mapped_features"), &PositionalBinder).unwrap();

        assert!(query.sql.starts_with("WITH T1 AS (\nSELECT user_id, id AS changeset_id, user_name AS username\nFROM osm_changeset\nWHERE (\"created_at\" BETWEEN $1 AND $2) AND ("));
        assert!(query.sql.contains("SELECT (each(osh.\"tags\")).key AS feature, action, count(distinct id) AS count\n"));
        assert!(query.sql.ends_with("GROUP BY feature, action\nORDER BY count DESC"));
        // Window plus three encodings for the hashtag and the project term.
        assert_eq!(query.binds.len(), 2 + 8 + 8);
        assert_eq!(query.binds[0], BindValue::from(ts("2021-08-27T09:00:00")));
    }

    #[rstest]
    fn test_summary_project_term_prefixed(summary: MapathonSummaryParams) {
        let parts = summary.assemble(&ComposeOptions::default()).unwrap();
        let fragment = statement(&parts, "mapped_features");
        assert!(fragment.binds().contains(&BindValue::from("%hotosm-project-11224;%")));
        assert!(fragment.binds().contains(&BindValue::from("%mapandchathour2021 %")));
    }

    #[rstest]
    fn test_summary_contributors_reuses_condition(summary: MapathonSummaryParams) {
        let parts = summary.assemble(&ComposeOptions::default()).unwrap();
        let features = statement(&parts, "mapped_features");
        let contributors = statement(&parts, "total_contributors");
        assert!(contributors.text().starts_with("SELECT COUNT(distinct user_id) AS contributors_count\nFROM osm_changeset\nWHERE "));
        assert_eq!(features.binds(), contributors.binds());
    }

    #[rstest]
    fn test_summary_without_filters_is_rejected(mut summary: MapathonSummaryParams) {
        summary.project_ids.clear();
        summary.hashtags.clear();
        let err = summary.assemble(&ComposeOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ComposeError::MissingDimension {
                report: ReportShape::MapathonSummary,
                dimension: "hashtags or project_ids",
            }
        );
    }

    #[rstest]
    fn test_summary_reversed_window_is_rejected(mut summary: MapathonSummaryParams) {
        std::mem::swap(&mut summary.from_timestamp, &mut summary.to_timestamp);
        let err = summary.assemble(&ComposeOptions::default()).unwrap_err();
        assert!(matches!(err, ComposeError::InvalidParameter { field: "from_timestamp", .. }));
    }

    #[rstest]
    fn test_underpass_summary(mut summary: MapathonSummaryParams) {
        summary.source = DataSource::Underpass;
        let parts = summary.assemble(&ComposeOptions::default()).unwrap();
        let query = bind(statement(&parts, "mapped_features"), &InlineBinder).unwrap();

        assert!(query.sql.contains(
            "WHERE (\"created_at\" BETWEEN '2021-08-27 09:00:00.000000'::timestamp AND '2021-08-27 11:00:00.000000'::timestamp) \
             AND ('mapandchathour2021' = ANY(\"hashtags\") OR 'hotosm-project-11224' = ANY(\"hashtags\"))"
        ));
        assert!(query.sql.contains("UNION ALL"));
        assert!(query.sql.ends_with("ORDER BY count DESC"));

        let contributors = bind(statement(&parts, "total_contributors"), &PositionalBinder).unwrap();
        assert_eq!(
            contributors.sql,
            "SELECT COUNT(distinct user_id) AS contributors_count\nFROM changesets\n\
             WHERE (\"created_at\" BETWEEN $1 AND $2) AND ($3 = ANY(\"hashtags\") OR $4 = ANY(\"hashtags\"))"
        );
    }

    #[rstest]
    fn test_detail_orders_by_user_first(detail: MapathonDetailParams) {
        let parts = detail.assemble(&ComposeOptions::default()).unwrap();
        let fragment = statement(&parts, "mapped_features");
        assert!(fragment.text().contains(
            "SELECT (each(osh.\"tags\")).key AS feature, action, count(distinct id) AS count, user_id, username\n"
        ));
        assert!(fragment.text().ends_with("GROUP BY feature, action, user_id, username\nORDER BY user_id, action, count"));
    }

    #[rstest]
    fn test_detail_contributors_pipeline(detail: MapathonDetailParams) {
        let parts = detail.assemble(&ComposeOptions::default()).unwrap();
        let query = bind(statement(&parts, "contributors"), &PositionalBinder).unwrap();

        assert!(query.sql.contains("),\nT2 AS (\nSELECT (each(osh.\"tags\")).key AS feature, user_id, username"));
        assert!(query.sql.contains("WHERE feature = 'building'"));
        // 2 window binds + 2 terms x 8 attribution binds inside T1.
        assert!(query.sql.contains("\"public\".tasks_per_user(user_id, $19, $20, $21, 'MAPPED') AS mapped_tasks"));
        assert!(query.sql.contains("\"public\".tasks_per_user(user_id, $22, $23, $24, 'VALIDATED') AS validated_tasks"));
        assert!(query.sql.contains("\"public\".editors_per_user(user_id, $25, $26) AS editors\nFROM T3"));
        assert_eq!(query.binds[18], BindValue::from("11224,10042"));
        assert_eq!(query.binds.len(), 26);
    }

    #[rstest]
    fn test_detail_custom_function_schema(detail: MapathonDetailParams) {
        let options = ComposeOptions {
            function_schema: "insights".to_string(),
            ..ComposeOptions::default()
        };
        let parts = detail.assemble(&options).unwrap();
        assert!(statement(&parts, "contributors").text().contains("\"insights\".editors_per_user("));
    }
}
