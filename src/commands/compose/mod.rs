mod execute;
mod output;

use std::path::PathBuf;

use clap::Args;

/// Compose the SQL statements of a report request
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  galaxy_query compose request.json                   # Every statement, positional binds
  galaxy_query --binding inline compose request.json  # Values rendered as literals
  cat request.json | galaxy_query compose -           # Read the request from stdin
  galaxy_query compose request.json -s contributors   # One statement of the report")]
pub struct ComposeCmd {
    /// Request JSON file, or `-` for standard input
    #[arg(value_name = "FILE")]
    pub request: PathBuf,

    /// Only output the statement with this name
    #[arg(short, long)]
    pub statement: Option<String>,
}
