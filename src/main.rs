use clap::Parser;
use tracing_subscriber::EnvFilter;

use msi_scan::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("msi_scan=debug,info")
    } else {
        EnvFilter::new("msi_scan=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Identify(args) => cli::identify::run(args)?,
        cli::Commands::Scan(args) => cli::scan::run(args)?,
        cli::Commands::Run(args) => cli::pipeline::run(args)?,
    }

    Ok(())
}
