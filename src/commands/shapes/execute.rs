use std::error::Error;

use serde::Serialize;

use super::ShapesCmd;
use crate::commands::Execute;
use crate::config::ComposeConfig;
use crate::queries::{ReportShape, StatementShape};

/// A report family and its statements.
#[derive(Debug, Clone, Serialize)]
pub struct ShapeEntry {
    pub report: ReportShape,
    pub statements: &'static [StatementShape],
}

/// Result of the shapes command execution
#[derive(Debug, Clone, Serialize)]
pub struct ShapesResult {
    pub reports: Vec<ShapeEntry>,
}

impl Execute for ShapesCmd {
    type Output = ShapesResult;

    fn execute(self, _config: &ComposeConfig) -> Result<Self::Output, Box<dyn Error>> {
        let shapes = match self.report {
            Some(name) => vec![name.parse::<ReportShape>()?],
            None => ReportShape::ALL.to_vec(),
        };
        Ok(ShapesResult {
            reports: shapes
                .into_iter()
                .map(|report| ShapeEntry {
                    report,
                    statements: report.statements(),
                })
                .collect(),
        })
    }
}
