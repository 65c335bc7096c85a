//! Training listing and organisations.

use crate::queries::builder::helpers::{format_fields, where_clause};
use crate::queries::builder::{QueryBuilder, SqlFragment};
use crate::queries::combinator::all_of;
use crate::queries::predicate::{date_bounds, Predicate};
use crate::queries::report::{AssembleReport, ComposeOptions, ReportShape, TRAINING_COLUMNS};
use crate::queries::ComposeError;
use crate::types::{TrainingOrganisationsParams, TrainingParams};

/// Training events narrowed by whichever filters are present.
#[derive(Debug)]
pub struct TrainingQueryBuilder<'a> {
    pub params: &'a TrainingParams,
}

impl TrainingQueryBuilder<'_> {
    /// AND of the present filters; empty when none is.
    pub fn condition(&self) -> Result<SqlFragment, ComposeError> {
        let params = self.params;
        if let (Some(from), Some(to)) = (params.from_datestamp, params.to_datestamp) {
            if from > to {
                return Err(ComposeError::InvalidParameter {
                    report: ReportShape::TrainingListing,
                    field: "from_datestamp",
                    message: format!("{} is after to_datestamp {}", from, to),
                });
            }
        }

        let mut organisation = SqlFragment::new();
        if let Some(oid) = params.oid {
            organisation.push_sql("\"organization\" = ").push_bind(oid);
        }
        let event_types: Vec<String> = params.event_type.iter().cloned().collect();

        Ok(all_of([
            organisation,
            Predicate::ExactMatch { column: "topictype", values: &params.topic_type }.build(),
            Predicate::ExactMatch { column: "eventtype", values: &event_types }.build(),
            date_bounds("date", params.from_datestamp, params.to_datestamp),
        ]))
    }
}

impl QueryBuilder for TrainingQueryBuilder<'_> {
    fn build(&self) -> Result<SqlFragment, ComposeError> {
        let mut query =
            SqlFragment::sql(format!("SELECT {}\nFROM training", format_fields(TRAINING_COLUMNS)));
        query.push(where_clause(self.condition()?));
        Ok(query)
    }
}

#[derive(Debug)]
pub struct OrganisationsQueryBuilder;

impl QueryBuilder for OrganisationsQueryBuilder {
    fn build(&self) -> Result<SqlFragment, ComposeError> {
        Ok(SqlFragment::sql("SELECT oid AS id, name\nFROM organizations\nORDER BY oid"))
    }
}

impl AssembleReport for TrainingParams {
    fn shape(&self) -> ReportShape {
        ReportShape::TrainingListing
    }

    fn assemble(&self, _options: &ComposeOptions) -> Result<Vec<(&'static str, SqlFragment)>, ComposeError> {
        Ok(vec![("trainings", TrainingQueryBuilder { params: self }.build()?)])
    }
}

impl AssembleReport for TrainingOrganisationsParams {
    fn shape(&self) -> ReportShape {
        ReportShape::TrainingOrganisations
    }

    fn assemble(&self, _options: &ComposeOptions) -> Result<Vec<(&'static str, SqlFragment)>, ComposeError> {
        Ok(vec![("organisations", OrganisationsQueryBuilder.build()?)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::BindValue;
    use crate::queries::builder::{bind, InlineBinder, PositionalBinder};
    use chrono::NaiveDate;
    use rstest::rstest;

    const TRAINING_SELECT: &str =
        "SELECT id, name, location, organization, eventtype, topictype, date\nFROM training";

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn compose(params: &TrainingParams) -> String {
        let parts = params.assemble(&ComposeOptions::default()).unwrap();
        bind(parts[0].1.clone(), &PositionalBinder).unwrap().sql
    }

    #[rstest]
    fn test_no_filters_no_where() {
        assert_eq!(compose(&TrainingParams::default()), TRAINING_SELECT);
    }

    #[rstest]
    fn test_select_list_matches_result_columns() {
        let columns = ReportShape::TrainingListing.statements()[0].columns;
        assert!(!columns.contains(&"*"));
        assert!(compose(&TrainingParams::default()).starts_with(&format!("SELECT {}\n", columns.join(", "))));
    }

    #[rstest]
    #[case::both(Some("2022-01-01"), Some("2022-02-01"), "WHERE (\"date\" BETWEEN $1::date AND $2::date)")]
    #[case::from_only(Some("2022-01-01"), None, "WHERE (\"date\" >= $1::date)")]
    #[case::to_only(None, Some("2022-02-01"), "WHERE (\"date\" <= $1::date)")]
    fn test_date_bounds(#[case] from: Option<&str>, #[case] to: Option<&str>, #[case] expected: &str) {
        let params = TrainingParams {
            from_datestamp: from.map(date),
            to_datestamp: to.map(date),
            ..TrainingParams::default()
        };
        assert!(compose(&params).ends_with(expected));
    }

    #[rstest]
    fn test_all_filters() {
        let params = TrainingParams {
            oid: Some(4),
            topic_type: vec!["Remote".to_string(), "Field".to_string()],
            event_type: Some("Mapathon".to_string()),
            from_datestamp: Some(date("2022-01-01")),
            to_datestamp: None,
        };
        let parts = params.assemble(&ComposeOptions::default()).unwrap();
        let query = bind(parts[0].1.clone(), &PositionalBinder).unwrap();
        assert_eq!(
            query.sql,
            format!("{}\nWHERE (\"organization\" = $1) AND (\"topictype\" = $2 OR \"topictype\" = $3) \
             AND (\"eventtype\" = $4) AND (\"date\" >= $5::date)", TRAINING_SELECT)
        );
        assert_eq!(query.binds[0], BindValue::Int(4));
        assert_eq!(query.binds[4], BindValue::Date(date("2022-01-01")));
    }

    #[rstest]
    fn test_topic_type_injection_inline() {
        let params = TrainingParams {
            topic_type: vec!["x' OR '1'='1".to_string()],
            ..TrainingParams::default()
        };
        let parts = params.assemble(&ComposeOptions::default()).unwrap();
        let query = bind(parts[0].1.clone(), &InlineBinder).unwrap();
        assert_eq!(
            query.sql,
            format!("{}\nWHERE (\"topictype\" = 'x'' OR ''1''=''1')", TRAINING_SELECT)
        );
    }

    #[rstest]
    fn test_reversed_dates_rejected() {
        let params = TrainingParams {
            from_datestamp: Some(date("2022-02-01")),
            to_datestamp: Some(date("2022-01-01")),
            ..TrainingParams::default()
        };
        let err = params.assemble(&ComposeOptions::default()).unwrap_err();
        assert!(matches!(err, ComposeError::InvalidParameter { field: "from_datestamp", .. }));
    }

    #[rstest]
    fn test_organisations() {
        let parts = TrainingOrganisationsParams {}.assemble(&ComposeOptions::default()).unwrap();
        assert_eq!(parts[0].0, "organisations");
        assert_eq!(parts[0].1.text(), "SELECT oid AS id, name\nFROM organizations\nORDER BY oid");
        assert!(parts[0].1.binds().is_empty());
    }
}
