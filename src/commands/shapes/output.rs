//! Output formatting for shapes command results.

use super::execute::ShapesResult;
use crate::output::Outputable;

impl Outputable for ShapesResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Report families ({}):", self.reports.len()));
        for entry in &self.reports {
            lines.push(String::new());
            lines.push(entry.report.to_string());
            for statement in entry.statements {
                lines.push(format!("  {}: {}", statement.name, statement.columns.join(", ")));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::super::execute::ShapeEntry;
    use super::*;
    use crate::queries::ReportShape;
    use rstest::{fixture, rstest};

    #[fixture]
    fn summary_shape() -> ShapesResult {
        ShapesResult {
            reports: vec![ShapeEntry {
                report: ReportShape::MapathonSummary,
                statements: ReportShape::MapathonSummary.statements(),
            }],
        }
    }

    crate::output_table_test! {
        test_name: test_to_table,
        fixture: summary_shape,
        fixture_type: ShapesResult,
        expected: "Report families (1):\n\nmapathon_summary\n  mapped_features: feature, action, count\n  total_contributors: contributors_count",
    }

    crate::output_json_test! {
        test_name: test_format_json,
        fixture: summary_shape,
        fixture_type: ShapesResult,
        assertions: {
            "reports": serde_json::json!([{
                "report": "mapathon_summary",
                "statements": [
                    {"name": "mapped_features", "columns": ["feature", "action", "count"]},
                    {"name": "total_contributors", "columns": ["contributors_count"]}
                ]
            }]),
        },
    }
}
