//! Output formatting for compose command results.

use super::execute::ComposeResult;
use crate::output::{indent, Outputable};
use crate::queries::builder::BindingStyle;

impl Outputable for ComposeResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        let binding = match self.binding {
            BindingStyle::Positional => "positional",
            BindingStyle::Inline => "inline",
        };
        lines.push(format!("Report: {} ({} binding)", self.report, binding));

        for statement in &self.statements {
            lines.push(String::new());
            lines.push(format!("{} [{}]", statement.name, statement.columns.join(", ")));
            lines.extend(indent(&statement.sql, "  "));
            if !statement.binds.is_empty() {
                lines.push(format!("  Binds ({}):", statement.binds.len()));
                for (index, value) in statement.binds.iter().enumerate() {
                    lines.push(format!("    ${} = {}", index + 1, value));
                }
            }
        }

        lines.join("\n")
    }
}
