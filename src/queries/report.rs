//! Report families and their dispatch to assemblers.
//!
//! Each [`ReportRequest`] variant wraps the parameter record of one family
//! and is assembled by that record's [`AssembleReport`] implementation, so
//! adding a family is a new variant rather than a new string branch.

use std::fmt;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::queries::builder::{bind, Binder, ComposedQuery, SqlFragment};
use crate::queries::ComposeError;
use crate::types::{
    DataQualityHashtagParams, DataQualityProjectParams, DataQualityUsernameParams,
    MapathonDetailParams, MapathonSummaryParams, TrainingOrganisationsParams, TrainingParams,
    UserListParams, UserStatisticsParams,
};

/// Report family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportShape {
    MapathonSummary,
    MapathonDetail,
    DataQualityByProject,
    DataQualityByUsername,
    DataQualityByHashtag,
    UserStatistics,
    UserList,
    TrainingListing,
    TrainingOrganisations,
}

/// Name and result columns of one statement of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatementShape {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

const MAPPED_FEATURES: StatementShape = StatementShape {
    name: "mapped_features",
    columns: &["feature", "action", "count"],
};

/// Columns of one training event row.
pub(crate) const TRAINING_COLUMNS: &[&str] =
    &["id", "name", "location", "organization", "eventtype", "topictype", "date"];

const DATA_QUALITY_COLUMNS: &[&str] = &[
    "Osm_id",
    "Changeset_id",
    "Changeset_timestamp",
    "Issue_type",
    "lng",
    "lat",
];

impl ReportShape {
    pub const ALL: [ReportShape; 9] = [
        ReportShape::MapathonSummary,
        ReportShape::MapathonDetail,
        ReportShape::DataQualityByProject,
        ReportShape::DataQualityByUsername,
        ReportShape::DataQualityByHashtag,
        ReportShape::UserStatistics,
        ReportShape::UserList,
        ReportShape::TrainingListing,
        ReportShape::TrainingOrganisations,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ReportShape::MapathonSummary => "mapathon_summary",
            ReportShape::MapathonDetail => "mapathon_detail",
            ReportShape::DataQualityByProject => "data_quality_by_project",
            ReportShape::DataQualityByUsername => "data_quality_by_username",
            ReportShape::DataQualityByHashtag => "data_quality_by_hashtag",
            ReportShape::UserStatistics => "user_statistics",
            ReportShape::UserList => "user_list",
            ReportShape::TrainingListing => "training_listing",
            ReportShape::TrainingOrganisations => "training_organisations",
        }
    }

    /// Statements produced for this family and the columns each returns.
    pub fn statements(&self) -> &'static [StatementShape] {
        match self {
            ReportShape::MapathonSummary => &[
                MAPPED_FEATURES,
                StatementShape {
                    name: "total_contributors",
                    columns: &["contributors_count"],
                },
            ],
            ReportShape::MapathonDetail => &[
                StatementShape {
                    name: "mapped_features",
                    columns: &["feature", "action", "count", "user_id", "username"],
                },
                StatementShape {
                    name: "contributors",
                    columns: &[
                        "user_id",
                        "username",
                        "total_buildings",
                        "mapped_tasks",
                        "validated_tasks",
                        "editors",
                    ],
                },
            ],
            ReportShape::DataQualityByProject => &[StatementShape {
                name: "issues",
                columns: DATA_QUALITY_COLUMNS,
            }],
            ReportShape::DataQualityByUsername => &[StatementShape {
                name: "issues",
                columns: &[
                    "Osm_id",
                    "Changeset_id",
                    "Changeset_timestamp",
                    "Issue_type",
                    "username",
                    "lng",
                    "lat",
                ],
            }],
            ReportShape::DataQualityByHashtag => &[StatementShape {
                name: "issues",
                columns: &["osm_id", "changeset_id", "lat", "lng", "created_at", "issues"],
            }],
            ReportShape::UserStatistics => &[StatementShape {
                name: "statistics",
                columns: &["feature", "action", "count"],
            }],
            ReportShape::UserList => &[StatementShape {
                name: "users",
                columns: &["user_id", "user_name"],
            }],
            ReportShape::TrainingListing => &[StatementShape {
                name: "trainings",
                columns: TRAINING_COLUMNS,
            }],
            ReportShape::TrainingOrganisations => &[StatementShape {
                name: "organisations",
                columns: &["id", "name"],
            }],
        }
    }
}

impl fmt::Display for ReportShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportShape {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportShape::ALL
            .into_iter()
            .find(|shape| shape.name() == s)
            .ok_or_else(|| ComposeError::UnsupportedReport { name: s.to_string() })
    }
}

/// Settings that shape composed statements but never carry request data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeOptions {
    /// Schema holding `tasks_per_user` and `editors_per_user`
    pub function_schema: String,
    /// Prefix turning a Tasking Manager project id into a hashtag
    pub project_hashtag_prefix: String,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            function_schema: "public".to_string(),
            project_hashtag_prefix: "hotosm-project-".to_string(),
        }
    }
}

/// One assembler per report family.
#[enum_dispatch]
pub trait AssembleReport {
    fn shape(&self) -> ReportShape;

    /// Build every statement of the report as `(statement name, fragment)`.
    fn assemble(&self, options: &ComposeOptions) -> Result<Vec<(&'static str, SqlFragment)>, ComposeError>;
}

/// A validated report request, tagged by family.
#[enum_dispatch(AssembleReport)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum ReportRequest {
    MapathonSummary(MapathonSummaryParams),
    MapathonDetail(MapathonDetailParams),
    DataQualityByProject(DataQualityProjectParams),
    DataQualityByUsername(DataQualityUsernameParams),
    DataQualityByHashtag(DataQualityHashtagParams),
    UserStatistics(UserStatisticsParams),
    UserList(UserListParams),
    TrainingListing(TrainingParams),
    TrainingOrganisations(TrainingOrganisationsParams),
}

/// A named statement of a composed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub name: &'static str,
    pub query: ComposedQuery,
}

/// Every statement of one report, ready for the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedReport {
    pub shape: ReportShape,
    pub statements: Vec<Statement>,
}

impl ComposedReport {
    /// Look up a statement by name.
    pub fn statement(&self, name: &str) -> Option<&ComposedQuery> {
        self.statements
            .iter()
            .find(|statement| statement.name == name)
            .map(|statement| &statement.query)
    }
}

/// Compose every statement of a report request.
pub fn compose(
    request: &ReportRequest,
    options: &ComposeOptions,
    binder: &dyn Binder,
) -> Result<ComposedReport, ComposeError> {
    let shape = request.shape();
    let statements = request
        .assemble(options)?
        .into_iter()
        .map(|(name, fragment)| {
            bind(fragment, binder).map(|query| Statement { name, query })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        report = %shape,
        binder = binder.name(),
        statements = statements.len(),
        binds = statements.iter().map(|s| s.query.param_count()).sum::<usize>(),
        "composed report"
    );

    Ok(ComposedReport { shape, statements })
}
