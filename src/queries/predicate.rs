//! Single boolean SQL fragments built from primitive filter inputs.
//!
//! Column names are structural and always quoted; every request value is
//! bound. An empty input collection produces an empty fragment, which the
//! combinator skips.

use chrono::{NaiveDate, NaiveDateTime};

use crate::db::{escape_like, quote_identifier, BindValue};
use crate::queries::builder::SqlFragment;
use crate::queries::combinator::any_of;

/// hstore column of `osm_changeset` holding `hashtags` and `comment`.
pub const HSTORE_COLUMN: &str = "tags";

/// How a hashtag or project term is physically encoded on a changeset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashtagEncoding {
    /// Structured `hashtags` tag, term followed by `;`
    Tag,
    /// Free-text `comment`, term followed by a space
    Comment,
    /// Either representation, term at the very end of the string
    EndOfString,
}

impl HashtagEncoding {
    pub const ALL: [HashtagEncoding; 3] = [
        HashtagEncoding::Tag,
        HashtagEncoding::Comment,
        HashtagEncoding::EndOfString,
    ];
}

/// A primitive predicate over one column.
#[derive(Debug, Clone, Copy)]
pub enum Predicate<'a> {
    /// One encoding of an hstore hashtag/comment mention
    Hashtag { term: &'a str, encoding: HashtagEncoding },
    /// Inclusive `BETWEEN` over a timestamp column
    TimestampRange {
        column: &'a str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    },
    /// Membership of each value in an array column, OR-joined
    ArrayContains { column: &'a str, values: &'a [String] },
    /// Equality of a scalar column with each value, OR-joined
    ExactMatch { column: &'a str, values: &'a [String] },
}

impl Predicate<'_> {
    pub fn build(&self) -> SqlFragment {
        match *self {
            Predicate::Hashtag { term, encoding } => hashtag_encoding(term, encoding),
            Predicate::TimestampRange { column, from, to } => timestamp_between(column, from, to),
            Predicate::ArrayContains { column, values } => any_of(values.iter().map(|value| {
                let mut fragment = SqlFragment::new();
                fragment
                    .push_bind(value.as_str())
                    .push_sql(&format!(" = ANY({})", quote_identifier(column)));
                fragment
            })),
            Predicate::ExactMatch { column, values } => any_of(values.iter().map(|value| {
                let mut fragment = SqlFragment::sql(format!("{} = ", quote_identifier(column)));
                fragment.push_bind(value.as_str());
                fragment
            })),
        }
    }
}

/// `("tags" -> key) ~~ pattern`
fn hstore_like(key: &str, pattern: String) -> SqlFragment {
    let mut fragment = SqlFragment::sql(format!("({} -> ", quote_identifier(HSTORE_COLUMN)));
    fragment.push_bind(key).push_sql(") ~~ ").push_bind(pattern);
    fragment
}

/// Build the predicate for one encoding of a term.
pub fn hashtag_encoding(term: &str, encoding: HashtagEncoding) -> SqlFragment {
    let term = escape_like(term);
    match encoding {
        HashtagEncoding::Tag => hstore_like("hashtags", format!("%{};%", term)),
        HashtagEncoding::Comment => hstore_like("comment", format!("%{} %", term)),
        HashtagEncoding::EndOfString => any_of([
            hstore_like("hashtags", format!("%{}", term)),
            hstore_like("comment", format!("%{}", term)),
        ])
        .parenthesized(),
    }
}

/// Attribution filter over the hstore store: every encoding of every term, OR-joined.
///
/// Yields `3 × terms.len()` top-level alternatives, or an empty fragment.
pub fn attribution_filter(terms: &[String]) -> SqlFragment {
    any_of(terms.iter().flat_map(|term| {
        HashtagEncoding::ALL
            .into_iter()
            .map(move |encoding| Predicate::Hashtag { term, encoding }.build())
    }))
}

/// Hashtag terms for Tasking Manager project ids.
pub fn project_terms(prefix: &str, project_ids: &[i64]) -> Vec<String> {
    project_ids.iter().map(|id| format!("{}{}", prefix, id)).collect()
}

/// `"column" BETWEEN from AND to`
pub fn timestamp_between(column: &str, from: NaiveDateTime, to: NaiveDateTime) -> SqlFragment {
    let mut fragment = SqlFragment::sql(format!("{} BETWEEN ", quote_identifier(column)));
    fragment.push_bind(from).push_sql(" AND ").push_bind(to);
    fragment
}

/// `"column" IN (v1, v2, ...)`, empty when there are no values.
pub fn in_list<V: Into<BindValue>>(column: &str, values: impl IntoIterator<Item = V>) -> SqlFragment {
    let mut items = SqlFragment::new();
    for value in values {
        if !items.binds().is_empty() {
            items.push_sql(", ");
        }
        items.push_bind(value);
    }
    if items.binds().is_empty() {
        return items;
    }
    let mut fragment = SqlFragment::sql(format!("{} IN (", quote_identifier(column)));
    fragment.push(items).push_sql(")");
    fragment
}

/// Date bound over a `date` column, depending on which ends are present.
///
/// Both ends give a closed `BETWEEN`, one end an open bound, none no predicate.
pub fn date_bounds(column: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> SqlFragment {
    let column = quote_identifier(column);
    let mut fragment = SqlFragment::new();
    match (from, to) {
        (Some(from), Some(to)) => {
            fragment
                .push_sql(&format!("{} BETWEEN ", column))
                .push_bind(from)
                .push_sql("::date AND ")
                .push_bind(to)
                .push_sql("::date");
        }
        (Some(from), None) => {
            fragment.push_sql(&format!("{} >= ", column)).push_bind(from).push_sql("::date");
        }
        (None, Some(to)) => {
            fragment.push_sql(&format!("{} <= ", column)).push_bind(to).push_sql("::date");
        }
        (None, None) => {}
    }
    fragment
}

/// `ST_Contains(ST_GeomFromGeoJSON(geojson), "column")`
///
/// The GeoJSON text is produced by the crate's own serializer and bound.
pub fn contained_in(geojson: String, column: &str) -> SqlFragment {
    let mut fragment = SqlFragment::sql("ST_Contains(ST_GeomFromGeoJSON(");
    fragment
        .push_bind(geojson)
        .push_sql(&format!("), {})", quote_identifier(column)));
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[rstest]
    fn test_tag_encoding() {
        let fragment = hashtag_encoding("mapathon", HashtagEncoding::Tag);
        assert_eq!(fragment.text(), "(\"tags\" -> $?) ~~ $?");
        assert_eq!(fragment.binds(), &[BindValue::from("hashtags"), BindValue::from("%mapathon;%")]);
    }

    #[rstest]
    fn test_comment_encoding() {
        let fragment = hashtag_encoding("mapathon", HashtagEncoding::Comment);
        assert_eq!(fragment.binds(), &[BindValue::from("comment"), BindValue::from("%mapathon %")]);
    }

    #[rstest]
    fn test_end_of_string_encoding_covers_both_keys() {
        let fragment = hashtag_encoding("mapathon", HashtagEncoding::EndOfString);
        assert_eq!(
            fragment.text(),
            "((\"tags\" -> $?) ~~ $? OR (\"tags\" -> $?) ~~ $?)"
        );
        assert_eq!(
            fragment.binds(),
            &[
                BindValue::from("hashtags"),
                BindValue::from("%mapathon"),
                BindValue::from("comment"),
                BindValue::from("%mapathon"),
            ]
        );
    }

    #[rstest]
    fn test_encoding_escapes_like_metacharacters() {
        let fragment = hashtag_encoding("100%_map", HashtagEncoding::Tag);
        assert_eq!(fragment.binds()[1], BindValue::from(r"%100\%\_map;%"));
    }

    #[rstest]
    fn test_attribution_filter_empty() {
        assert!(attribution_filter(&[]).is_empty());
    }

    #[rstest]
    fn test_attribution_filter_marker_count() {
        let terms = vec!["a".to_string(), "b".to_string()];
        let fragment = attribution_filter(&terms);
        // Tag and comment bind 2 values, end-of-string binds 4, per term.
        assert_eq!(fragment.binds().len(), 16);
        assert_eq!(fragment.marker_count(), 16);
    }

    #[rstest]
    fn test_project_terms() {
        assert_eq!(
            project_terms("hotosm-project-", &[11224, 10042]),
            vec!["hotosm-project-11224", "hotosm-project-10042"]
        );
    }

    #[rstest]
    fn test_timestamp_between() {
        let from = ts("2021-08-27T09:00:00");
        let to = ts("2021-08-27T11:00:00");
        let fragment = timestamp_between("created_at", from, to);
        assert_eq!(fragment.text(), "\"created_at\" BETWEEN $? AND $?");
        assert_eq!(fragment.binds(), &[BindValue::from(from), BindValue::from(to)]);
    }

    #[rstest]
    fn test_array_contains() {
        let values = vec!["badvalue".to_string(), "badgeom".to_string()];
        let fragment = Predicate::ArrayContains { column: "status", values: &values }.build();
        assert_eq!(fragment.text(), "$? = ANY(\"status\") OR $? = ANY(\"status\")");
    }

    #[rstest]
    fn test_exact_match() {
        let values = vec!["Fadhil".to_string()];
        let fragment = Predicate::ExactMatch { column: "username", values: &values }.build();
        assert_eq!(fragment.text(), "\"username\" = $?");
        assert_eq!(fragment.binds(), &[BindValue::from("Fadhil")]);
    }

    #[rstest]
    fn test_exact_match_empty() {
        let fragment = Predicate::ExactMatch { column: "username", values: &[] }.build();
        assert!(fragment.is_empty());
    }

    #[rstest]
    fn test_in_list() {
        let fragment = in_list("user_name", vec!["a", "b"]);
        assert_eq!(fragment.text(), "\"user_name\" IN ($?, $?)");
        assert!(in_list::<&str>("user_name", vec![]).is_empty());
    }

    #[rstest]
    #[case(Some("2022-01-01"), Some("2022-02-01"), "\"date\" BETWEEN $?::date AND $?::date", 2)]
    #[case(Some("2022-01-01"), None, "\"date\" >= $?::date", 1)]
    #[case(None, Some("2022-02-01"), "\"date\" <= $?::date", 1)]
    #[case(None, None, "", 0)]
    fn test_date_bounds(
        #[case] from: Option<&str>,
        #[case] to: Option<&str>,
        #[case] expected: &str,
        #[case] binds: usize,
    ) {
        let fragment = date_bounds("date", from.map(date), to.map(date));
        assert_eq!(fragment.text(), expected);
        assert_eq!(fragment.binds().len(), binds);
    }

    #[rstest]
    fn test_contained_in_binds_geojson() {
        let fragment = contained_in("{\"type\":\"Polygon\"}".to_string(), "location");
        assert_eq!(fragment.text(), "ST_Contains(ST_GeomFromGeoJSON($?), \"location\")");
        assert_eq!(fragment.binds().len(), 1);
    }
}
