use clap::Parser;

use galaxy_query::cli::Args;
use galaxy_query::config::ComposeConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = ComposeConfig::load()?;
    if let Some(binding) = args.binding {
        config.binding = binding;
    }
    let output = args.command.run(&config, args.format)?;
    println!("{}", output);
    Ok(())
}
