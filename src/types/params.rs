//! Request parameter records, one per report family.
//!
//! These arrive already validated and type-coerced by the API layer and are
//! read-only from here on. The assemblers still check the few invariants a
//! statement depends on (ordered time window, required dimensions).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::geometry::Polygon;

/// Kind of validation issue attached to an edited object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    BadValue,
    BadGeom,
    /// Wildcard for every known kind
    All,
}

impl IssueType {
    /// Every concrete issue kind, in the order used by the status filters.
    pub const KNOWN: [IssueType; 2] = [IssueType::BadValue, IssueType::BadGeom];

    /// Value stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::BadValue => "badvalue",
            IssueType::BadGeom => "badgeom",
            IssueType::All => "all",
        }
    }
}

/// Expand a requested issue set into status values.
///
/// The wildcard wins over anything else; otherwise the request order is kept
/// and duplicates dropped.
pub fn expand_issue_types(requested: &[IssueType]) -> Vec<&'static str> {
    if requested.contains(&IssueType::All) {
        return IssueType::KNOWN.iter().map(IssueType::as_str).collect();
    }
    let mut statuses: Vec<&'static str> = Vec::with_capacity(requested.len());
    for issue in requested {
        if !statuses.contains(&issue.as_str()) {
            statuses.push(issue.as_str());
        }
    }
    statuses
}

/// Which store the mapathon summary reads from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// `osm_changeset` / `osm_element_history` with hstore tags
    #[default]
    Insights,
    /// `changesets` with hashtag arrays and added/modified counters
    Underpass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapathonSummaryParams {
    #[serde(default)]
    pub project_ids: Vec<i64>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    pub from_timestamp: NaiveDateTime,
    pub to_timestamp: NaiveDateTime,
    #[serde(default)]
    pub source: DataSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapathonDetailParams {
    #[serde(default)]
    pub project_ids: Vec<i64>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    pub from_timestamp: NaiveDateTime,
    pub to_timestamp: NaiveDateTime,
}

/// Data-quality report for Tasking Manager projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityProjectParams {
    pub project_ids: Vec<i64>,
    pub issue_types: Vec<IssueType>,
    #[serde(default)]
    pub geometry: Option<Polygon>,
}

/// Data-quality report for a set of OSM usernames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityUsernameParams {
    pub osm_usernames: Vec<String>,
    pub issue_types: Vec<IssueType>,
    pub from_timestamp: NaiveDateTime,
    pub to_timestamp: NaiveDateTime,
    #[serde(default)]
    pub geometry: Option<Polygon>,
}

/// Data-quality report for changesets carrying hashtags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityHashtagParams {
    #[serde(default)]
    pub hashtags: Vec<String>,
    pub issue_types: Vec<IssueType>,
    pub from_timestamp: NaiveDateTime,
    pub to_timestamp: NaiveDateTime,
    #[serde(default)]
    pub geometry: Option<Polygon>,
}

/// Statistics for one user, optionally scoped by hashtags/projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStatisticsParams {
    pub user_id: i64,
    pub from_timestamp: NaiveDateTime,
    pub to_timestamp: NaiveDateTime,
    #[serde(default)]
    pub project_ids: Vec<i64>,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

impl UserStatisticsParams {
    /// True when the statistics are scoped by hashtag or project attribution.
    pub fn is_scoped(&self) -> bool {
        !self.project_ids.is_empty() || !self.hashtags.is_empty()
    }
}

/// Lookup of user ids for usernames active in a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListParams {
    pub user_names: Vec<String>,
    pub from_timestamp: NaiveDateTime,
    pub to_timestamp: NaiveDateTime,
}

/// Training listing filters. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    #[serde(default)]
    pub oid: Option<i64>,
    #[serde(default)]
    pub topic_type: Vec<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub from_datestamp: Option<NaiveDate>,
    #[serde(default)]
    pub to_datestamp: Option<NaiveDate>,
}

/// Listing of training organisations. Takes no filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingOrganisationsParams {}
