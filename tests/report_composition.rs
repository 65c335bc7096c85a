//! End-to-end composition properties over the public API.

use chrono::{NaiveDate, NaiveDateTime};
use galaxy_query::db::BindValue;
use galaxy_query::queries::builder::{InlineBinder, PositionalBinder};
use galaxy_query::queries::predicate::attribution_filter;
use galaxy_query::queries::{compose, ComposeError, ComposeOptions, ReportRequest, ReportShape};
use galaxy_query::types::{
    DataQualityProjectParams, IssueType, MapathonDetailParams, MapathonSummaryParams,
    TrainingParams,
};
use rstest::{fixture, rstest};

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
}

/// Split a condition on ` OR ` outside any parentheses.
fn top_level_alternatives(sql: &str) -> usize {
    let mut depth = 0i32;
    let mut count = 1;
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth -= 1,
            b' ' if depth == 0 && sql[i..].starts_with(" OR ") => {
                count += 1;
                i += 3;
            }
            _ => {}
        }
        i += 1;
    }
    count
}

#[fixture]
fn summary() -> MapathonSummaryParams {
    MapathonSummaryParams {
        project_ids: vec![11224],
        hashtags: vec!["mapandchathour2021".to_string(), "missingmaps".to_string()],
        from_timestamp: ts("2021-08-27T09:00:00"),
        to_timestamp: ts("2021-08-27T11:00:00"),
        source: Default::default(),
    }
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
fn test_attribution_has_three_alternatives_per_term(#[case] terms: usize) {
    let terms: Vec<String> = (0..terms).map(|i| format!("tag{}", i)).collect();
    let filter = attribution_filter(&terms);
    assert_eq!(top_level_alternatives(filter.text()), 3 * terms.len());
}

#[rstest]
fn test_empty_mapathon_filters_rejected(mut summary: MapathonSummaryParams) {
    summary.project_ids.clear();
    summary.hashtags.clear();
    let request = ReportRequest::from(summary);
    let err = compose(&request, &ComposeOptions::default(), &PositionalBinder).unwrap_err();
    assert!(matches!(
        err,
        ComposeError::MissingDimension { report: ReportShape::MapathonSummary, .. }
    ));
}

#[rstest]
fn test_window_is_inclusive_between(summary: MapathonSummaryParams) {
    let request = ReportRequest::from(summary);
    let report = compose(&request, &ComposeOptions::default(), &PositionalBinder).unwrap();
    let query = report.statement("mapped_features").unwrap();
    assert!(query.sql.contains("\"created_at\" BETWEEN $1 AND $2"));
    assert_eq!(query.binds[0], BindValue::Timestamp(ts("2021-08-27T09:00:00")));
    assert_eq!(query.binds[1], BindValue::Timestamp(ts("2021-08-27T11:00:00")));
}

#[rstest]
fn test_detail_ordering() {
    let request = ReportRequest::from(MapathonDetailParams {
        project_ids: vec![],
        hashtags: vec!["missingmaps".to_string()],
        from_timestamp: ts("2021-08-27T09:00:00"),
        to_timestamp: ts("2021-08-27T11:00:00"),
    });
    let report = compose(&request, &ComposeOptions::default(), &PositionalBinder).unwrap();
    let query = report.statement("mapped_features").unwrap();
    assert!(query.sql.ends_with("ORDER BY user_id, action, count"));
}

#[rstest]
fn test_composition_is_deterministic(summary: MapathonSummaryParams) {
    let request = ReportRequest::from(summary);
    let options = ComposeOptions::default();
    let first = compose(&request, &options, &PositionalBinder).unwrap();
    let second = compose(&request, &options, &PositionalBinder).unwrap();
    assert_eq!(first, second);
}

#[rstest]
fn test_hostile_hashtag_never_reaches_positional_text(mut summary: MapathonSummaryParams) {
    summary.hashtags = vec!["x'); DROP TABLE osm_changeset; --".to_string()];
    let request = ReportRequest::from(summary);
    let options = ComposeOptions::default();

    let positional = compose(&request, &options, &PositionalBinder).unwrap();
    for statement in &positional.statements {
        assert!(!statement.query.sql.contains("DROP TABLE"));
        assert_eq!(
            statement.query.sql.matches('$').count(),
            statement.query.binds.len()
        );
    }

    let inline = compose(&request, &options, &InlineBinder).unwrap();
    let sql = &inline.statement("mapped_features").unwrap().sql;
    assert!(sql.contains("'%x''); DROP TABLE osm\\_changeset; --;%'"));
    assert!(!sql.contains("'%x'); DROP"));
}

#[rstest]
#[case::both(Some("2022-01-01"), Some("2022-02-01"), Some("\"date\" BETWEEN $1::date AND $2::date"))]
#[case::from_only(Some("2022-01-01"), None, Some("\"date\" >= $1::date"))]
#[case::to_only(None, Some("2022-02-01"), Some("\"date\" <= $1::date"))]
#[case::neither(None, None, None)]
fn test_training_date_predicate(
    #[case] from: Option<&str>,
    #[case] to: Option<&str>,
    #[case] expected: Option<&str>,
) {
    let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
    let request = ReportRequest::from(TrainingParams {
        from_datestamp: from.map(parse),
        to_datestamp: to.map(parse),
        ..TrainingParams::default()
    });
    let report = compose(&request, &ComposeOptions::default(), &PositionalBinder).unwrap();
    let sql = &report.statement("trainings").unwrap().sql;
    match expected {
        Some(predicate) => assert!(sql.ends_with(&format!("WHERE ({})", predicate))),
        None => assert!(!sql.contains("WHERE")),
    }
}

#[rstest]
fn test_data_quality_requires_issue_types() {
    let request = ReportRequest::from(DataQualityProjectParams {
        project_ids: vec![11224],
        issue_types: vec![],
        geometry: None,
    });
    let err = compose(&request, &ComposeOptions::default(), &PositionalBinder).unwrap_err();
    assert_eq!(
        err,
        ComposeError::MissingDimension {
            report: ReportShape::DataQualityByProject,
            dimension: "issue_types",
        }
    );
}

#[rstest]
fn test_every_statement_matches_its_shape() {
    let requests = [
        r#"{"report": "mapathon_summary", "hashtags": ["a"], "from_timestamp": "2021-01-01T00:00:00", "to_timestamp": "2021-01-02T00:00:00"}"#,
        r#"{"report": "mapathon_summary", "source": "underpass", "hashtags": ["a"], "from_timestamp": "2021-01-01T00:00:00", "to_timestamp": "2021-01-02T00:00:00"}"#,
        r#"{"report": "mapathon_detail", "project_ids": [1], "from_timestamp": "2021-01-01T00:00:00", "to_timestamp": "2021-01-02T00:00:00"}"#,
        r#"{"report": "data_quality_by_project", "project_ids": [1], "issue_types": ["all"]}"#,
        r#"{"report": "data_quality_by_username", "osm_usernames": ["a"], "issue_types": ["badgeom"], "from_timestamp": "2021-01-01T00:00:00", "to_timestamp": "2021-01-02T00:00:00"}"#,
        r#"{"report": "data_quality_by_hashtag", "issue_types": ["badvalue"], "from_timestamp": "2021-01-01T00:00:00", "to_timestamp": "2021-01-02T00:00:00"}"#,
        r#"{"report": "user_statistics", "user_id": 7, "from_timestamp": "2021-01-01T00:00:00", "to_timestamp": "2021-01-02T00:00:00"}"#,
        r#"{"report": "user_list", "user_names": ["a"], "from_timestamp": "2021-01-01T00:00:00", "to_timestamp": "2021-01-02T00:00:00"}"#,
        r#"{"report": "training_listing"}"#,
        r#"{"report": "training_organisations"}"#,
    ];
    for json in requests {
        let request: ReportRequest = serde_json::from_str(json).unwrap();
        let report = compose(&request, &ComposeOptions::default(), &PositionalBinder).unwrap();
        let names: Vec<&str> = report.statements.iter().map(|s| s.name).collect();
        let expected: Vec<&str> = report.shape.statements().iter().map(|s| s.name).collect();
        assert_eq!(names, expected, "{}", report.shape);
    }
}

#[rstest]
fn test_issue_type_wildcard_expands() {
    let request = ReportRequest::from(DataQualityProjectParams {
        project_ids: vec![1],
        issue_types: vec![IssueType::BadGeom, IssueType::All],
        geometry: None,
    });
    let report = compose(&request, &ComposeOptions::default(), &PositionalBinder).unwrap();
    let binds = &report.statement("issues").unwrap().binds;
    assert_eq!(&binds[1..], &[BindValue::from("badvalue"), BindValue::from("badgeom")]);
}
