mod execute;
mod output;

use clap::Args;

/// List report families and the columns of their statements
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  galaxy_query shapes                            # Every report family
  galaxy_query shapes -r mapathon_detail         # One family
  galaxy_query shapes --format json              # Machine-readable contract")]
pub struct ShapesCmd {
    /// Only show this report family
    #[arg(short, long)]
    pub report: Option<String>,
}
