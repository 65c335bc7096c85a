//! Request parameter types shared by the report assemblers.

mod geometry;
mod params;

pub use geometry::{Polygon, PolygonKind};
pub use params::{
    expand_issue_types, DataQualityHashtagParams, DataQualityProjectParams,
    DataQualityUsernameParams, DataSource, IssueType, MapathonDetailParams,
    MapathonSummaryParams, TrainingOrganisationsParams, TrainingParams, UserListParams,
    UserStatisticsParams,
};
