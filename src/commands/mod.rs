//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - An `Execute` implementation producing a serializable result
//! - An `Outputable` implementation rendering that result as a table

mod compose;
mod shapes;

pub use compose::ComposeCmd;
pub use shapes::ShapesCmd;

use clap::Subcommand;
use std::error::Error;

use crate::config::ComposeConfig;
use crate::output::{OutputFormat, Outputable};

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, config: &ComposeConfig) -> Result<Self::Output, Box<dyn Error>>;
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compose the SQL statements of a report request
    Compose(ComposeCmd),

    /// List report families and the columns of their statements
    Shapes(ShapesCmd),

    /// Catch-all for unknown commands
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run(self, config: &ComposeConfig, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        match self {
            Command::Compose(cmd) => {
                let result = cmd.execute(config)?;
                Ok(result.format(format))
            }
            Command::Shapes(cmd) => {
                let result = cmd.execute(config)?;
                Ok(result.format(format))
            }
            Command::Unknown(args) => {
                Err(format!("Unknown command: {}", args.first().map(String::as_str).unwrap_or_default()).into())
            }
        }
    }
}
