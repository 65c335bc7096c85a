//! Output formatting for command results.
//!
//! Supports multiple output formats: table (human-readable), JSON, and toon.

use clap::ValueEnum;
use serde::Serialize;

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Token-efficient toon format
    Toon,
}

/// Trait for types that can be formatted for output
pub trait Outputable: Serialize {
    /// Format as a human-readable table
    fn to_table(&self) -> String;

    /// Format according to the specified output format
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => self.to_table(),
            OutputFormat::Json => serde_json::to_string_pretty(self).unwrap_or_default(),
            OutputFormat::Toon => {
                let json_value = serde_json::to_value(self).unwrap_or_default();
                toon::encode(&json_value, None)
            }
        }
    }
}

/// Indent every line of a multi-line block.
pub fn indent(block: &str, prefix: &str) -> Vec<String> {
    block.lines().map(|line| format!("{}{}", prefix, line)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: &'static str,
    }

    impl Outputable for Sample {
        fn to_table(&self) -> String {
            format!("Sample: {}", self.name)
        }
    }

    #[test]
    fn test_table_uses_to_table() {
        assert_eq!(Sample { name: "x" }.format(OutputFormat::Table), "Sample: x");
    }

    #[test]
    fn test_json_is_pretty() {
        assert_eq!(Sample { name: "x" }.format(OutputFormat::Json), "{\n  \"name\": \"x\"\n}");
    }

    #[test]
    fn test_toon() {
        assert!(Sample { name: "x" }.format(OutputFormat::Toon).contains("name: x"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("a\nb", "  "), vec!["  a", "  b"]);
    }
}
