use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use serde::Serialize;

use super::ComposeCmd;
use crate::commands::Execute;
use crate::config::ComposeConfig;
use crate::db::BindValue;
use crate::queries::builder::{get_binder, BindingStyle};
use crate::queries::{compose, ReportRequest, ReportShape};

/// One composed statement with its result columns.
#[derive(Debug, Clone, Serialize)]
pub struct StatementOutput {
    pub name: &'static str,
    pub columns: Vec<&'static str>,
    pub sql: String,
    pub binds: Vec<BindValue>,
}

/// Result of the compose command execution
#[derive(Debug, Clone, Serialize)]
pub struct ComposeResult {
    pub report: ReportShape,
    pub binding: BindingStyle,
    pub statements: Vec<StatementOutput>,
}

fn read_request(path: &Path) -> Result<String, Box<dyn Error>> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| format!("Failed to read request from stdin: {}", e))?;
        return Ok(content);
    }
    fs::read_to_string(path)
        .map_err(|e| format!("Failed to read request {}: {}", path.display(), e).into())
}

/// Parse and compose one request document.
pub fn compose_request(
    json: &str,
    statement: Option<&str>,
    config: &ComposeConfig,
) -> Result<ComposeResult, Box<dyn Error>> {
    let request: ReportRequest =
        serde_json::from_str(json).map_err(|e| format!("Invalid report request: {}", e))?;
    let binder = get_binder(config.binding);
    let report = compose(&request, &config.options, binder.as_ref())?;

    let shapes = report.shape.statements();
    let mut statements: Vec<StatementOutput> = report
        .statements
        .into_iter()
        .map(|s| StatementOutput {
            name: s.name,
            columns: shapes
                .iter()
                .find(|shape| shape.name == s.name)
                .map(|shape| shape.columns.to_vec())
                .unwrap_or_default(),
            sql: s.query.sql,
            binds: s.query.binds,
        })
        .collect();

    if let Some(wanted) = statement {
        statements.retain(|s| s.name == wanted);
        if statements.is_empty() {
            let available: Vec<&str> = shapes.iter().map(|shape| shape.name).collect();
            return Err(format!(
                "Report {} has no statement '{}' (available: {})",
                report.shape,
                wanted,
                available.join(", ")
            )
            .into());
        }
    }

    Ok(ComposeResult {
        report: report.shape,
        binding: config.binding,
        statements,
    })
}

impl Execute for ComposeCmd {
    type Output = ComposeResult;

    fn execute(self, config: &ComposeConfig) -> Result<Self::Output, Box<dyn Error>> {
        let json = read_request(&self.request)?;
        compose_request(&json, self.statement.as_deref(), config)
    }
}
