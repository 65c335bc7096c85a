//! Per-user statistics and username lookup.

use crate::db::quote_identifier;
use crate::queries::builder::helpers::{where_clause, with_ctes};
use crate::queries::builder::{QueryBuilder, SqlFragment};
use crate::queries::combinator::{all_of, require_non_empty, require_window};
use crate::queries::mapathon::ChangesetQueryBuilder;
use crate::queries::predicate::{in_list, timestamp_between, HSTORE_COLUMN};
use crate::queries::report::{AssembleReport, ComposeOptions, ReportShape};
use crate::queries::ComposeError;
use crate::types::{UserListParams, UserStatisticsParams};

/// Alias of `osm_element_history` when joined against `T1`.
const HISTORY_ALIAS: &str = "osh";

/// Feature/action counts of one user's edits.
///
/// Unscoped requests read `osm_element_history` directly. Scoped requests
/// first select the user's attributed changesets as `T1` and join on them.
#[derive(Debug)]
pub struct UserStatisticsQueryBuilder<'a> {
    pub params: &'a UserStatisticsParams,
    pub options: &'a ComposeOptions,
}

impl UserStatisticsQueryBuilder<'_> {
    /// Quoted history column, qualified by the alias when there is one.
    fn column(alias: Option<&str>, name: &str) -> String {
        match alias {
            Some(alias) => format!("{}.{}", alias, quote_identifier(name)),
            None => quote_identifier(name),
        }
    }

    /// Counts over `osm_element_history`, filtered by window, user and
    /// feature-bearing element type plus any `extra` conditions.
    fn counts(&self, alias: Option<&str>, from: &str, extra: SqlFragment) -> SqlFragment {
        let params = self.params;
        let column = |name: &str| Self::column(alias, name);

        let mut window = SqlFragment::sql(format!("{} BETWEEN ", column("timestamp")));
        window
            .push_bind(params.from_timestamp)
            .push_sql(" AND ")
            .push_bind(params.to_timestamp);
        let mut uid = SqlFragment::sql(format!("{} = ", column("uid")));
        uid.push_bind(params.user_id);
        // Only ways and relations carry the feature tags that are counted.
        let counted_types = SqlFragment::sql(format!("{} IN ('way', 'relation')", column("type")));

        let mut query = SqlFragment::sql(format!(
            "SELECT (each({})).key AS feature, {} AS action, count(distinct {}) AS count\nFROM {}",
            column(HSTORE_COLUMN),
            column("action"),
            column("id"),
            from,
        ));
        query
            .push(where_clause(all_of([window, uid, counted_types, extra])))
            .push_sql("\nGROUP BY feature, action");
        query
    }

    fn window_only(&self) -> SqlFragment {
        self.counts(None, "osm_element_history", SqlFragment::new())
    }

    fn scoped(&self) -> Result<SqlFragment, ComposeError> {
        let params = self.params;
        let changesets = ChangesetQueryBuilder {
            report: ReportShape::UserStatistics,
            project_ids: &params.project_ids,
            hashtags: &params.hashtags,
            from_timestamp: params.from_timestamp,
            to_timestamp: params.to_timestamp,
            user_id: Some(params.user_id),
            options: self.options,
        };

        let join = SqlFragment::sql(format!(
            "T1.changeset_id = {}",
            Self::column(Some(HISTORY_ALIAS), "changeset")
        ));
        let body = self.counts(
            Some(HISTORY_ALIAS),
            &format!("osm_element_history AS {}, T1", HISTORY_ALIAS),
            join,
        );
        Ok(with_ctes(vec![("T1", changesets.build()?)], body))
    }
}

impl QueryBuilder for UserStatisticsQueryBuilder<'_> {
    fn build(&self) -> Result<SqlFragment, ComposeError> {
        let params = self.params;
        require_window(ReportShape::UserStatistics, params.from_timestamp, params.to_timestamp)?;
        if params.is_scoped() {
            self.scoped()
        } else {
            Ok(self.window_only())
        }
    }
}

/// Distinct user ids behind a set of usernames active in a window.
#[derive(Debug)]
pub struct UserListQueryBuilder<'a> {
    pub params: &'a UserListParams,
}

impl QueryBuilder for UserListQueryBuilder<'_> {
    fn build(&self) -> Result<SqlFragment, ComposeError> {
        let report = ReportShape::UserList;
        let params = self.params;
        require_non_empty(report, "user_names", &params.user_names)?;
        require_window(report, params.from_timestamp, params.to_timestamp)?;

        let mut query = SqlFragment::sql("SELECT DISTINCT user_id, user_name\nFROM osm_changeset");
        query.push(where_clause(all_of([
            timestamp_between("created_at", params.from_timestamp, params.to_timestamp),
            in_list("user_name", params.user_names.iter().map(String::as_str)),
        ])));
        Ok(query)
    }
}

impl AssembleReport for UserStatisticsParams {
    fn shape(&self) -> ReportShape {
        ReportShape::UserStatistics
    }

    fn assemble(&self, options: &ComposeOptions) -> Result<Vec<(&'static str, SqlFragment)>, ComposeError> {
        let builder = UserStatisticsQueryBuilder { params: self, options };
        Ok(vec![("statistics", builder.build()?)])
    }
}

impl AssembleReport for UserListParams {
    fn shape(&self) -> ReportShape {
        ReportShape::UserList
    }

    fn assemble(&self, _options: &ComposeOptions) -> Result<Vec<(&'static str, SqlFragment)>, ComposeError> {
        Ok(vec![("users", UserListQueryBuilder { params: self }.build()?)])
    }
}
